use crate::models::Restaurant;

/// Price indicator: one currency glyph per price level.
pub fn price_glyphs(price_range: u8) -> String {
    "€".repeat(price_range as usize)
}

/// Cuisine tags as list rows show them.
pub fn cuisine_line(tags: &[String]) -> String {
    tags.join(", ")
}

/// Cuisine tags as the detail header shows them.
pub fn cuisine_banner(tags: &[String]) -> String {
    tags.join(" • ")
}

pub fn rating_line(rating: Option<f64>) -> Option<String> {
    rating.map(|r| format!("★ {r:.1}"))
}

/// One list row: name, cuisines, price level, rating when present, address.
pub fn restaurant_row(restaurant: &Restaurant) -> String {
    let mut row = format!(
        "{} — {} {}",
        restaurant.name,
        cuisine_line(&restaurant.cuisine_type),
        price_glyphs(restaurant.price_range),
    );

    if let Some(rating) = rating_line(restaurant.rating) {
        row.push_str(&format!(" {rating}"));
    }

    row.push_str(&format!("\n    {}", restaurant.address));
    row
}
