#![allow(dead_code)]

use model::{geo::Polygon, shop::NewShop};

pub fn polygon(rings: &[&[[f64; 2]]]) -> Polygon {
    Polygon::from(rings.iter().map(|ring| ring.to_vec()).collect::<Vec<_>>())
}

pub fn square(min_lon: f64, min_lat: f64, size: f64) -> Polygon {
    let (max_lon, max_lat) = (min_lon + size, min_lat + size);
    polygon(&[&[
        [min_lon, min_lat],
        [max_lon, min_lat],
        [max_lon, max_lat],
        [min_lon, max_lat],
        [min_lon, min_lat],
    ]])
}

pub fn shop(name: &str, categories: &[&str], areas: Vec<Polygon>) -> NewShop {
    NewShop::new(name, categories.iter().copied(), areas)
}

pub fn names(shops: &[model::shop::ShopRecord]) -> Vec<&str> {
    shops.iter().map(|shop| shop.content.name.as_str()).collect()
}
