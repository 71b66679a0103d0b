//! Plain-text rendering of views to stdout.

use std::io::{self, Write};

use shopfront_core::{Cart, Page, Product};
use shopfront_storefront::{NavSummary, StorefrontConfig};

pub fn products(
    out: &mut impl Write,
    config: &StorefrontConfig,
    page: &Page<Product>,
) -> io::Result<()> {
    if page.items.is_empty() {
        writeln!(out, "No products found.")?;
    }
    for product in &page.items {
        writeln!(
            out,
            "#{:<5} {:<32} {:<16} {:>10}  {} stars",
            product.id,
            product.name,
            product.category.as_deref().unwrap_or("-"),
            config.format_price(product.price),
            product.rating,
        )?;
    }
    writeln!(
        out,
        "Page {} of {} ({} products)",
        page.number, page.total_pages, page.total_items
    )
}

pub fn categories(out: &mut impl Write, categories: &[String]) -> io::Result<()> {
    for category in categories {
        writeln!(out, "{category}")?;
    }
    Ok(())
}

pub fn cart(out: &mut impl Write, config: &StorefrontConfig, cart: &Cart) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }
    for item in cart.items() {
        writeln!(
            out,
            "#{:<5} {:<32} x{:<4} {:>10} {:>12}",
            item.id,
            item.product.name,
            item.quantity,
            config.format_price(item.product.price),
            config.format_price(item.line_total()),
        )?;
    }
    writeln!(out, "Total: {}", config.format_price(cart.total()))
}

pub fn nav(out: &mut impl Write, nav: &NavSummary) -> io::Result<()> {
    match &nav.username {
        Some(username) => writeln!(out, "Signed in as {username}")?,
        None => writeln!(out, "Not signed in")?,
    }
    writeln!(out, "Cart: {} item(s)", nav.cart_count)
}

/// A single status line.
pub fn line(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{message}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use shopfront_core::{CartItem, CartItemId, CartProduct, Price, ProductId, Rating};

    fn config() -> StorefrontConfig {
        StorefrontConfig::for_api("http://localhost:8000/api", "/tmp/shopfront-render.json")
            .unwrap()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_products_page() {
        let products = vec![Product {
            id: ProductId::new(7),
            name: "Green Tea".to_string(),
            description: String::new(),
            price: Price::parse("4.50").unwrap(),
            category: None,
            rating: Rating::new(4.2).unwrap(),
        }];
        let page = Page::of(&products, 1, 10);
        let text = render(|out| super::products(out, &config(), &page));

        assert!(text.contains("Green Tea"));
        assert!(text.contains("₹4.5"));
        assert!(text.contains("4.2 stars"));
        assert!(text.ends_with("Page 1 of 1 (1 products)\n"));
    }

    #[test]
    fn test_empty_cart() {
        let text = render(|out| super::cart(out, &config(), &Cart::default()));
        assert_eq!(text, "Your cart is empty.\n");
    }

    #[test]
    fn test_cart_total() {
        let cart = Cart::new(vec![CartItem {
            id: CartItemId::new(1),
            product: CartProduct {
                id: ProductId::new(3),
                name: "Mug".to_string(),
                price: Price::from_units(5),
            },
            quantity: 2,
        }]);
        let text = render(|out| super::cart(out, &config(), &cart));
        assert!(text.ends_with("Total: ₹10\n"));
    }

    #[test]
    fn test_anonymous_nav() {
        let text = render(|out| super::nav(out, &NavSummary::default()));
        assert_eq!(text, "Not signed in\nCart: 0 item(s)\n");
    }
}
