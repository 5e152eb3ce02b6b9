//! [`Query`] definition.

pub mod invoices;
pub mod offer;
pub mod offers;
pub mod partner;
pub mod properties;
pub mod property;
pub mod property_tag;
pub mod property_type;
pub mod user;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::{
            fixture, update_property::Changes, CreateProperty,
            CreatePropertyType, MarkPropertyCancelled, UpdateProperty,
        },
        domain::{property, property_type},
        read::property::list::{
            Arguments, Comparison, Filter, PriceCondition, Selector,
        },
        Command as _,
    };

    use super::{properties, property_type as types, user};

    #[tokio::test]
    async fn lists_properties_by_best_price() {
        let svc = fixture::service();
        let seller = fixture::user(&svc, "seller").await;
        let mut ids = vec![];
        for name in ["Loft", "Barn", "Villa"] {
            let draft = CreateProperty {
                name: property::Name::new(name).unwrap(),
                ..fixture::draft(seller.id, 100_000)
            };
            ids.push(svc.execute(draft).await.unwrap().id);
        }
        drop(fixture::offer(&svc, ids[0], 1_000).await);
        drop(fixture::offer(&svc, ids[0], 5_000).await);
        drop(fixture::offer(&svc, ids[1], 2_000).await);

        let filter = Filter {
            best_price: Some(PriceCondition {
                comparison: Comparison::Gt,
                value: Decimal::from(1_500),
            }),
            ..Filter::default()
        };
        let page = svc
            .execute(properties::List::by(Selector {
                arguments: Arguments::Forward {
                    first: 10,
                    after: None,
                },
                filter: filter.clone(),
            }))
            .await
            .unwrap();
        let count = svc
            .execute(properties::TotalCount::by(filter))
            .await
            .unwrap();

        let mut found = page.edges.iter().map(|e| e.node).collect::<Vec<_>>();
        found.sort_unstable();
        let mut expected = vec![ids[0], ids[1]];
        expected.sort_unstable();
        assert_eq!(found, expected);
        assert_eq!(i32::from(count), 2);
    }

    #[tokio::test]
    async fn searches_properties_by_any_name_word() {
        let svc = fixture::service();
        let seller = fixture::user(&svc, "seller").await;
        let mut ids = vec![];
        for name in ["Sunny Loft", "Old Barn", "Villa"] {
            let draft = CreateProperty {
                name: property::Name::new(name).unwrap(),
                ..fixture::draft(seller.id, 100_000)
            };
            ids.push(svc.execute(draft).await.unwrap().id);
        }

        let page = svc
            .execute(properties::List::by(Selector {
                arguments: Arguments::Forward {
                    first: 10,
                    after: None,
                },
                filter: Filter {
                    name: Some(property::Name::new("loft BARN").unwrap()),
                    ..Filter::default()
                },
            }))
            .await
            .unwrap();

        let mut found = page.edges.iter().map(|e| e.node).collect::<Vec<_>>();
        found.sort_unstable();
        let mut expected = vec![ids[0], ids[1]];
        expected.sort_unstable();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn lists_property_types_by_name() {
        let svc = fixture::service();
        for name in ["Mansion", "Apartment", "House"] {
            drop(
                svc.execute(CreatePropertyType {
                    name: property_type::Name::new(name).unwrap(),
                })
                .await
                .unwrap(),
            );
        }

        let all = svc.execute(types::All::by(())).await.unwrap();

        let names = all.iter().map(|t| t.name.to_string()).collect::<Vec<_>>();
        assert_eq!(names, ["Apartment", "House", "Mansion"]);
    }

    #[tokio::test]
    async fn paginates_and_hides_inactive() {
        let svc = fixture::service();
        let seller = fixture::user(&svc, "seller").await;
        let mut ids = vec![];
        for _ in 0..3 {
            let draft = fixture::draft(seller.id, 100_000);
            ids.push(svc.execute(draft).await.unwrap().id);
        }
        ids.sort_unstable();
        drop(
            svc.execute(UpdateProperty {
                property_id: ids[2],
                changes: Changes {
                    is_active: Some(false),
                    ..Changes::default()
                },
            })
            .await
            .unwrap(),
        );

        let first = svc
            .execute(properties::List::by(Selector {
                arguments: Arguments::Forward {
                    first: 1,
                    after: None,
                },
                filter: Filter::default(),
            }))
            .await
            .unwrap();
        let second = svc
            .execute(properties::List::by(Selector {
                arguments: Arguments::Forward {
                    first: 1,
                    after: first.page_info().end_cursor,
                },
                filter: Filter::default(),
            }))
            .await
            .unwrap();

        assert_eq!(first.edges[0].node, ids[0]);
        assert!(first.page_info().has_next_page);
        assert_eq!(second.edges[0].node, ids[1]);
        assert!(!second.page_info().has_next_page);
    }

    #[tokio::test]
    async fn active_listings_exclude_closed_properties() {
        let svc = fixture::service();
        let open = fixture::property(&svc, 100_000).await;
        let closed = svc
            .execute(fixture::draft(open.salesperson_id, 1))
            .await
            .unwrap();
        drop(
            svc.execute(MarkPropertyCancelled {
                property_id: closed.id,
            })
            .await
            .unwrap(),
        );

        let listings = svc
            .execute(user::ActiveListings::by(open.salesperson_id))
            .await
            .unwrap();

        assert_eq!(
            listings.iter().map(|p| p.id).collect::<Vec<_>>(),
            [open.id],
        );
    }
}
