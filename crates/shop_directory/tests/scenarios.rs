mod common;

use std::collections::BTreeSet;

use common::{names, polygon, shop, square};
use model::category::CategoryCode;
use shop_directory::{ErrorKind, IndexKind, LocalDatabase, ShopDirectory};

const INDEXES: [IndexKind; 2] = [IndexKind::RTree, IndexKind::Grid { cell_degrees: 0.05 }];

const SQUARE_A: &[[f64; 2]] = &[
    [126.9, 37.5],
    [127.1, 37.5],
    [127.1, 37.7],
    [126.9, 37.7],
    [126.9, 37.5],
];

const SQUARE_B: &[[f64; 2]] = &[
    [127.0, 37.55],
    [127.2, 37.55],
    [127.2, 37.75],
    [127.0, 37.75],
    [127.0, 37.55],
];

async fn seoul(index: IndexKind) -> ShopDirectory<LocalDatabase> {
    let directory = ShopDirectory::in_memory(index);
    directory
        .insert_shop(shop("A", &["KOREAN"], vec![polygon(&[SQUARE_A])]))
        .await
        .unwrap();
    directory
}

#[tokio::test]
async fn simple_square() {
    for index in INDEXES {
        let directory = seoul(index).await;

        let shops = directory.shops_delivering_to(127.0, 37.6).await.unwrap();
        assert_eq!(names(&shops), vec!["A"]);
        assert_eq!(
            directory.categories_available_at(127.0, 37.6).await.unwrap(),
            BTreeSet::from([CategoryCode::Korean])
        );

        assert!(directory.shops_delivering_to(128.0, 37.6).await.unwrap().is_empty());
        assert!(directory
            .categories_available_at(128.0, 37.6)
            .await
            .unwrap()
            .is_empty());
    }
}

#[tokio::test]
async fn overlap_and_union() {
    for index in INDEXES {
        let directory = seoul(index).await;
        directory
            .insert_shop(shop("B", &["CHINESE", "CAFE"], vec![polygon(&[SQUARE_B])]))
            .await
            .unwrap();

        let shops = directory.shops_delivering_to(127.05, 37.6).await.unwrap();
        assert_eq!(names(&shops), vec!["A", "B"]);
        assert_eq!(
            directory.categories_available_at(127.05, 37.6).await.unwrap(),
            BTreeSet::from([CategoryCode::Korean, CategoryCode::Chinese, CategoryCode::Cafe])
        );

        // only inside B
        let shops = directory.shops_delivering_to(127.15, 37.72).await.unwrap();
        assert_eq!(names(&shops), vec!["B"]);
    }
}

#[tokio::test]
async fn antimeridian() {
    for index in INDEXES {
        let directory = ShopDirectory::in_memory(index);
        directory
            .insert_shop(shop(
                "C",
                &["WESTERN"],
                vec![polygon(&[&[
                    [179.5, 0.0],
                    [-179.5, 0.0],
                    [-179.5, 1.0],
                    [179.5, 1.0],
                    [179.5, 0.0],
                ]])],
            ))
            .await
            .unwrap();

        for (lon, lat) in [(179.9, 0.5), (-179.9, 0.5), (180.0, 0.5), (-180.0, 0.5)] {
            let shops = directory.shops_delivering_to(lon, lat).await.unwrap();
            assert_eq!(names(&shops), vec!["C"], "({}, {}) {:?}", lon, lat, index);
        }
        assert!(directory.shops_delivering_to(0.0, 0.5).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn hole() {
    for index in INDEXES {
        let directory = ShopDirectory::in_memory(index);
        directory
            .insert_shop(shop(
                "D",
                &["LUNCH_BOX"],
                vec![polygon(&[
                    &[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                    &[[3.0, 3.0], [7.0, 3.0], [7.0, 7.0], [3.0, 7.0], [3.0, 3.0]],
                ])],
            ))
            .await
            .unwrap();

        assert!(directory.shops_delivering_to(5.0, 5.0).await.unwrap().is_empty());
        assert_eq!(
            names(&directory.shops_delivering_to(1.0, 1.0).await.unwrap()),
            vec!["D"]
        );
        // the boundary of a hole belongs to the polygon
        assert_eq!(
            names(&directory.shops_delivering_to(7.0, 5.0).await.unwrap()),
            vec!["D"]
        );
    }
}

#[tokio::test]
async fn rejection() {
    let directory = seoul(IndexKind::RTree).await;

    let result = directory
        .insert_shop(shop("X", &["UNKNOWN"], vec![square(0.0, 0.0, 1.0)]))
        .await;
    assert_eq!(result.map_err(|why| why.kind()), Err(ErrorKind::InvalidCategory));

    let result = directory
        .insert_shop(shop(
            "Y",
            &["KOREAN"],
            vec![polygon(&[&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]])],
        ))
        .await;
    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidPolygon);
    assert_eq!(error.reason(), Some("NOT_CLOSED"));

    assert_eq!(directory.len().await, 1);
    assert!(directory.shops_delivering_to(0.5, 0.2).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejects_points_out_of_range() {
    let directory = seoul(IndexKind::RTree).await;
    for (lon, lat) in [(180.1, 0.0), (0.0, -90.5), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
        assert_eq!(
            directory
                .shops_delivering_to(lon, lat)
                .await
                .map(|_| ())
                .map_err(|why| why.kind()),
            Err(ErrorKind::InvalidPoint)
        );
        assert_eq!(
            directory
                .categories_available_at(lon, lat)
                .await
                .map(|_| ())
                .map_err(|why| why.kind()),
            Err(ErrorKind::InvalidPoint)
        );
    }
}

#[tokio::test]
async fn boundary_points_are_delivered_to() {
    let directory = seoul(IndexKind::RTree).await;
    // vertex, and a point on the western meridian edge
    for (lon, lat) in [(126.9, 37.5), (126.9, 37.6), (127.1, 37.7)] {
        assert_eq!(
            names(&directory.shops_delivering_to(lon, lat).await.unwrap()),
            vec!["A"],
            "({}, {})",
            lon,
            lat
        );
    }
}

#[tokio::test]
async fn identical_areas_of_two_shops_yield_both() {
    let directory = ShopDirectory::in_memory(IndexKind::RTree);
    for name in ["first", "second"] {
        directory
            .insert_shop(shop(name, &["PIZZA"], vec![square(0.0, 0.0, 1.0)]))
            .await
            .unwrap();
    }
    assert_eq!(
        names(&directory.shops_delivering_to(0.5, 0.5).await.unwrap()),
        vec!["first", "second"]
    );
}

#[tokio::test]
async fn polygon_around_the_north_pole() {
    let directory = ShopDirectory::in_memory(IndexKind::Grid { cell_degrees: 0.05 });
    directory
        .insert_shop(shop(
            "Polar",
            &["CAFE"],
            vec![polygon(&[&[
                [0.0, 80.0],
                [90.0, 80.0],
                [180.0, 80.0],
                [-90.0, 80.0],
                [0.0, 80.0],
            ]])],
        ))
        .await
        .unwrap();
    // edges bulge towards the pole, up to 82.9 degrees between the vertices
    for (lon, lat) in [(0.0, 90.0), (-137.0, 85.0), (0.0, 81.0), (45.0, 83.5)] {
        assert_eq!(
            names(&directory.shops_delivering_to(lon, lat).await.unwrap()),
            vec!["Polar"]
        );
    }
    assert!(directory.shops_delivering_to(45.0, 70.0).await.unwrap().is_empty());
    assert!(directory.shops_delivering_to(45.0, 82.0).await.unwrap().is_empty());
}

#[tokio::test]
async fn long_band_along_the_equator() {
    // wider than half the globe, so it holds antipodal points
    let band = polygon(&[&[
        [0.0, -0.5],
        [70.0, -0.5],
        [140.0, -0.5],
        [-150.0, -0.5],
        [-150.0, 0.5],
        [140.0, 0.5],
        [70.0, 0.5],
        [0.0, 0.5],
        [0.0, -0.5],
    ]]);
    for index in INDEXES {
        let directory = ShopDirectory::in_memory(index);
        directory
            .insert_shop(shop("Band", &["LUNCH_BOX"], vec![band.clone()]))
            .await
            .unwrap();
        for (lon, lat) in [(10.0, 0.0), (-170.0, 0.0), (90.0, 0.0), (30.0, 0.0)] {
            assert_eq!(
                names(&directory.shops_delivering_to(lon, lat).await.unwrap()),
                vec!["Band"]
            );
        }
        assert_eq!(
            directory.categories_available_at(10.0, 0.0).await.unwrap(),
            BTreeSet::from([CategoryCode::LunchBox])
        );
        assert!(directory.shops_delivering_to(-100.0, 0.0).await.unwrap().is_empty());
        assert!(directory.shops_delivering_to(10.0, 5.0).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn queries_are_idempotent() {
    let directory = seoul(IndexKind::RTree).await;
    let first = directory.shops_delivering_to(127.0, 37.6).await.unwrap();
    let second = directory.shops_delivering_to(127.0, 37.6).await.unwrap();
    assert_eq!(
        first.iter().map(|shop| shop.id).collect::<Vec<_>>(),
        second.iter().map(|shop| shop.id).collect::<Vec<_>>()
    );
}
