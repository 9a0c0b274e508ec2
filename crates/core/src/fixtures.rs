//! Test fixtures

use crate::{
    cart::CartLine,
    products::{ProductId, ProductSnapshot},
};

pub(crate) fn snapshot(id: &str, price: u64, stock: u32) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price,
        original_price: None,
        promotion_active: false,
        stock,
        category: "Soins".to_string(),
        image_ref: format!("/images/{id}.webp"),
        active: true,
        brand: None,
        description: None,
    }
}

pub(crate) fn snapshot_in(id: &str, category: &str) -> ProductSnapshot {
    ProductSnapshot {
        category: category.to_string(),
        ..snapshot(id, 1000, 10)
    }
}

pub(crate) fn promoted(id: &str, price: u64, original_price: u64) -> ProductSnapshot {
    ProductSnapshot {
        original_price: Some(original_price),
        promotion_active: true,
        ..snapshot(id, price, 10)
    }
}

pub(crate) fn line(id: &str, quantity: u32, cached_stock: u32) -> CartLine {
    CartLine {
        quantity,
        cached_stock,
        ..CartLine::from_snapshot(&snapshot(id, 1000, cached_stock), quantity)
    }
}
