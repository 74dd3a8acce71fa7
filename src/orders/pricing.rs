//! Prices a requested order against a fresh catalog snapshot.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::client::CatalogApi;
use super::OrderLineRequest;

/// One validated, priced line. Name and unit price are frozen copies of the
/// menu snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub menu_item_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

/// Validates the restaurant and every requested line against the catalog and
/// computes subtotals in decimal arithmetic. The restaurant check completes
/// before any menu fetch is issued; the first unavailable item aborts the
/// whole attempt with no partial result. Output lines keep request order.
pub async fn price_order<C: CatalogApi>(
    catalog: &C,
    restaurant_id: Uuid,
    lines: &[OrderLineRequest],
) -> Result<PricedOrder> {
    let restaurant = catalog.fetch_restaurant(restaurant_id).await?;
    if !restaurant.active {
        return Err(Error::RestaurantInactive(restaurant_id));
    }

    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;
    for line in lines {
        let item = catalog.fetch_menu_item(restaurant_id, line.menu_item_id).await?;
        if !item.available {
            return Err(Error::MenuItemUnavailable(item.name));
        }
        let subtotal = item.price * Decimal::from(line.quantity);
        total += subtotal;
        priced.push(PricedLine {
            menu_item_id: item.id,
            name: item.name,
            unit_price: item.price,
            quantity: line.quantity,
            subtotal,
        });
    }

    Ok(PricedOrder { lines: priced, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;

    fn line(menu_item_id: Uuid, quantity: u32) -> OrderLineRequest {
        OrderLineRequest { menu_item_id, quantity }
    }

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn prices_single_line() {
        let restaurant = Uuid::now_v7();
        let burger = Uuid::now_v7();
        let catalog = FakeCatalog::new()
            .with_restaurant(restaurant, "Grill House", true)
            .with_menu_item(restaurant, burger, "Burger", "5.00", true);

        let priced = price_order(&catalog, restaurant, &[line(burger, 2)]).await.unwrap();

        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].name, "Burger");
        assert_eq!(priced.lines[0].unit_price, decimal("5.00"));
        assert_eq!(priced.lines[0].quantity, 2);
        assert_eq!(priced.lines[0].subtotal, decimal("10.00"));
        assert_eq!(priced.total, decimal("10.00"));
    }

    #[tokio::test]
    async fn total_is_exact_in_decimal() {
        // 0.10 * 3 would already drift in binary floating point.
        let restaurant = Uuid::now_v7();
        let chutney = Uuid::now_v7();
        let papad = Uuid::now_v7();
        let catalog = FakeCatalog::new()
            .with_restaurant(restaurant, "Thali Corner", true)
            .with_menu_item(restaurant, chutney, "Chutney", "0.10", true)
            .with_menu_item(restaurant, papad, "Papad", "0.20", true);

        let priced = price_order(&catalog, restaurant, &[line(chutney, 3), line(papad, 1)])
            .await
            .unwrap();

        assert_eq!(priced.lines[0].subtotal, decimal("0.30"));
        assert_eq!(priced.total, decimal("0.50"));
    }

    #[tokio::test]
    async fn output_preserves_request_line_order() {
        let restaurant = Uuid::now_v7();
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::now_v7()).collect();
        let mut catalog = FakeCatalog::new().with_restaurant(restaurant, "Grill House", true);
        for (i, id) in ids.iter().enumerate() {
            catalog = catalog.with_menu_item(restaurant, *id, &format!("Item {i}"), "1.00", true);
        }

        // Request lines in reverse of menu order.
        let lines: Vec<OrderLineRequest> = ids.iter().rev().map(|id| line(*id, 1)).collect();
        let priced = price_order(&catalog, restaurant, &lines).await.unwrap();

        let got: Vec<Uuid> = priced.lines.iter().map(|l| l.menu_item_id).collect();
        let want: Vec<Uuid> = ids.iter().rev().copied().collect();
        assert_eq!(got, want);
    }

    #[tokio::test]
    async fn inactive_restaurant_prices_nothing() {
        let restaurant = Uuid::now_v7();
        let burger = Uuid::now_v7();
        let catalog = FakeCatalog::new()
            .with_restaurant(restaurant, "Closed Kitchen", false)
            .with_menu_item(restaurant, burger, "Burger", "5.00", true);

        let err = price_order(&catalog, restaurant, &[line(burger, 1)]).await.unwrap_err();
        assert!(matches!(err, Error::RestaurantInactive(id) if id == restaurant));
        // Only the restaurant lookup went out; no menu fetch was issued.
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn first_unavailable_item_fails_fast() {
        let restaurant = Uuid::now_v7();
        let burger = Uuid::now_v7();
        let fries = Uuid::now_v7();
        let cola = Uuid::now_v7();
        let catalog = FakeCatalog::new()
            .with_restaurant(restaurant, "Grill House", true)
            .with_menu_item(restaurant, burger, "Burger", "5.00", true)
            .with_menu_item(restaurant, fries, "Fries", "2.50", false)
            .with_menu_item(restaurant, cola, "Cola", "1.00", true);

        let err = price_order(
            &catalog,
            restaurant,
            &[line(burger, 1), line(fries, 1), line(cola, 1)],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::MenuItemUnavailable(name) if name == "Fries"));
        // Restaurant + two menu fetches; the third line was never looked up.
        assert_eq!(catalog.calls(), 3);
    }

    #[tokio::test]
    async fn unknown_menu_item_is_menu_item_not_found() {
        let restaurant = Uuid::now_v7();
        let catalog = FakeCatalog::new().with_restaurant(restaurant, "Grill House", true);

        let err = price_order(&catalog, restaurant, &[line(Uuid::now_v7(), 1)]).await.unwrap_err();
        assert!(matches!(err, Error::MenuItemNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_restaurant_is_restaurant_not_found() {
        let catalog = FakeCatalog::new();
        let err = price_order(&catalog, Uuid::now_v7(), &[line(Uuid::now_v7(), 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RestaurantNotFound(_)));
    }

    #[tokio::test]
    async fn empty_line_list_prices_to_zero() {
        let restaurant = Uuid::now_v7();
        let catalog = FakeCatalog::new().with_restaurant(restaurant, "Grill House", true);

        let priced = price_order(&catalog, restaurant, &[]).await.unwrap();
        assert!(priced.lines.is_empty());
        assert_eq!(priced.total, Decimal::ZERO);
    }
}
