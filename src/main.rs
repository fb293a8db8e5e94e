use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use georesto::{
    App,
    location::{Coordinate, LocationSource, NoLocation, StaticPosition},
    map::{MapSurface, Platform, presenter_for},
    render::{cuisine_banner, price_glyphs, rating_line, restaurant_row},
    store::RestaurantFilter,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Device position; omit both to run as if permission was denied.
    #[arg(long)]
    latitude: Option<f64>,

    #[arg(long)]
    longitude: Option<f64>,

    #[arg(long, value_enum, default_value_t = Target::Native)]
    platform: Target,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Native,
    Web,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Home listing with the resolved map viewport.
    List,
    /// Search with a name fragment and/or a cuisine tag.
    Search {
        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        cuisine: Option<String>,
    },
    /// Detail view for one restaurant.
    Show { id: Uuid },
    /// Favorites of the signed-in user (set GEORESTO_ACCESS_TOKEN).
    Favorites {
        /// Remove one entry by its favorite row id.
        #[arg(long)]
        remove: Option<Uuid>,
    },
    /// Toggle a favorite (set GEORESTO_ACCESS_TOKEN).
    Toggle { restaurant_id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let app = App::new().await;

    match args.command {
        Command::List => {
            let source: Box<dyn LocationSource> = match (args.latitude, args.longitude) {
                (Some(latitude), Some(longitude)) => Box::new(StaticPosition(Coordinate {
                    latitude,
                    longitude,
                })),
                _ => Box::new(NoLocation),
            };

            let view = app.home_view(source.as_ref()).await;

            if let Some(notice) = view.resolution.notice {
                println!("! {}", notice.message());
            }

            let platform = match args.platform {
                Target::Native => Platform::Native,
                Target::Web => Platform::Web,
            };
            print_surface(&presenter_for(platform).present(view.resolution.region, &view.restaurants));

            print_rows(&view.restaurants);
        }
        Command::Search { text, cuisine } => {
            let filter = RestaurantFilter { text, cuisine };
            print_rows(&app.search_view(&filter).await);
        }
        Command::Show { id } => match app.restaurant_detail(id).await {
            None => println!("Restaurant not found"),
            Some(detail) => {
                println!("{}", detail.restaurant.name);
                println!("{}", cuisine_banner(&detail.restaurant.cuisine_type));

                let mut meta = price_glyphs(detail.restaurant.price_range);
                if let Some(rating) = rating_line(detail.restaurant.rating) {
                    meta.push_str(&format!("  {rating}"));
                }
                println!("{meta}");

                if let Some(description) = &detail.restaurant.description {
                    println!("\n{description}");
                }

                println!("\n{}", detail.restaurant.address);
                println!("Directions: {}", detail.links.directions);
                if let Some(phone) = &detail.links.phone {
                    println!("Call: {phone}");
                }
                if let Some(website) = &detail.links.website {
                    println!("Website: {website}");
                }

                println!(
                    "\n{}",
                    if detail.favorite.is_favorited() {
                        "♥ favorited"
                    } else {
                        "♡ not favorited"
                    }
                );
            }
        },
        Command::Favorites { remove } => {
            if let Some(favorite_id) = remove {
                app.favorites.remove(favorite_id).await?;
                println!("Removed {favorite_id}");
            }

            let favorites = app.favorites_view().await;
            if favorites.is_empty() {
                println!("No favorites yet");
            }
            for favorite in &favorites {
                println!("{}  {}", favorite.id, restaurant_row(&favorite.restaurant));
            }
        }
        Command::Toggle { restaurant_id } => {
            let status = app.toggle_favorite(restaurant_id).await?;
            println!(
                "{}",
                if status.is_favorited() {
                    "♥ favorited"
                } else {
                    "♡ not favorited"
                }
            );
        }
    }

    Ok(())
}

fn print_surface(surface: &MapSurface) {
    match surface {
        MapSurface::Interactive { region, markers } => {
            println!(
                "Map centered on {:.4},{:.4} — {} markers",
                region.latitude,
                region.longitude,
                markers.len()
            );
        }
        MapSurface::Panel { count, maps_link } => {
            println!("Interactive map available on the mobile app — {count} restaurants in this area");
            println!("Open in maps: {maps_link}");
        }
    }
}

fn print_rows(restaurants: &[georesto::models::Restaurant]) {
    if restaurants.is_empty() {
        println!("No restaurants found");
        return;
    }

    for restaurant in restaurants {
        println!("{}  {}", restaurant.id, restaurant_row(restaurant));
    }
}
