use bson::doc;
use proptest::prelude::*;
use shelfquery::query::{self, Criteria, FindOptions, Order, Query, SortSpec};
use shelfquery::schema::Field;

proptest! {
    #[test]
    fn prop_decade_bucket(year in 1000i32..3000) {
        let Query::Aggregate { pipeline } = query::count_by_decade() else {
            unreachable!()
        };
        let docs = vec![doc! { "published_year": year }];
        let out = query::run_pipeline(&docs, &pipeline);
        prop_assert_eq!(out.len(), 1);
        prop_assert_eq!(out[0].get_i64("_id").unwrap(), i64::from(year - year % 10));
        prop_assert_eq!(out[0].get_i64("bookCount").unwrap(), 1);
    }

    #[test]
    fn prop_pagination_window_size(
        n in 0usize..30,
        limit in 0u32..10,
        skip in 0u64..40,
    ) {
        #[allow(clippy::cast_precision_loss)]
        let docs: Vec<bson::Document> =
            (0..n).map(|i| doc! { "price": i as f64 }).collect();
        let opts = FindOptions {
            projection: None,
            sort: Some(vec![SortSpec { field: Field::Price, order: Order::Asc }]),
            limit: Some(limit),
            skip: Some(skip),
        };
        let out = query::run_find(&docs, &Criteria::new(), &opts);
        let expected = n.saturating_sub(usize::try_from(skip).unwrap()).min(limit as usize);
        prop_assert_eq!(out.len(), expected);
        // window is contiguous and ascending
        for w in out.windows(2) {
            prop_assert!(w[0].get_f64("price").unwrap() <= w[1].get_f64("price").unwrap());
        }
    }

    #[test]
    fn prop_find_descriptor_round_trips(
        limit in proptest::option::of(0u32..10_000),
        skip in proptest::option::of(0u64..1000),
        year in 1900i32..2100,
    ) {
        let criteria = Criteria::new()
            .eq(Field::InStock, true)
            .gt(Field::PublishedYear, year);
        let opts = FindOptions {
            projection: Some(vec![Field::Title, Field::Price]),
            sort: Some(vec![SortSpec { field: Field::Price, order: Order::Asc }]),
            limit,
            skip,
        };
        let q = query::find_by(criteria, opts).unwrap();
        let json = serde_json::to_string(&q).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&back, &q);
        prop_assert_eq!(
            query::command_doc(&back, "books"),
            query::command_doc(&q, "books")
        );
    }
}
