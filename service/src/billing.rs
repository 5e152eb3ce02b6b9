//! Invoicing of sold [`Property`]s.

use common::{
    operations::{Insert, Perform},
    Currency, DateTime, Money, Percent,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use smart_default::SmartDefault;
use tracerr::Traced;

use crate::{
    domain::{
        invoice::{self, Invoice},
        partner,
        property::{self, Price},
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::Property;

/// Collaborator reacting to sale events of the [`Service`].
pub use common::Handler as Billing;

/// Label of the [`invoice::Line`] charging the selling fee.
pub const SELLING_FEE_LABEL: &str = "Selling Price Percentage";

/// Label of the [`invoice::Line`] charging the administration fee.
pub const ADMINISTRATION_FEE_LABEL: &str = "Administration Fee";

/// [`Billing`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Share of the selling price charged to the buyer.
    #[default(Percent::new(Decimal::from(6)).expect("valid `Percent`"))]
    pub selling_fee: Percent,

    /// Flat fee charged to the buyer.
    #[default(Decimal::ONE_HUNDRED)]
    pub administration_fee: Decimal,

    /// Code of the journal invoices are registered in.
    #[default(invoice::Journal::new("INV").expect("valid `Journal`"))]
    pub journal: invoice::Journal,

    /// [`Currency`] invoices are issued in.
    #[default(Currency::Usd)]
    pub currency: Currency,
}

/// Event of a [`Property`] being sold.
#[derive(Clone, Copy, Debug)]
pub struct PropertySold {
    /// ID of the sold [`Property`].
    pub property_id: property::Id,

    /// ID of the buyer, if one was recorded.
    pub buyer_id: Option<partner::Id>,

    /// Price the [`Property`] was sold for.
    pub selling_price: Price,
}

impl<Db> Billing<Perform<PropertySold>> for Service<Db>
where
    Db: Database<Insert<Invoice>, Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Perform(event): Perform<PropertySold>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PropertySold {
            property_id,
            buyer_id,
            selling_price,
        } = event;
        let conf = &self.config().billing;

        let partner_id = buyer_id
            .ok_or(E::NoBuyer(property_id))
            .map_err(tracerr::wrap!())?;

        let price = Money {
            amount: selling_price.value(),
            currency: conf.currency,
        };
        let selling_fee = price
            .share(conf.selling_fee)
            .ok_or(E::FeeOverflow(property_id))
            .map_err(tracerr::wrap!())?;
        let invoice = Invoice {
            id: invoice::Id::new(),
            property_id,
            partner_id,
            journal: conf.journal.clone(),
            lines: vec![
                invoice::Line {
                    label: SELLING_FEE_LABEL.into(),
                    quantity: Decimal::ONE,
                    unit_price: selling_fee,
                },
                invoice::Line {
                    label: ADMINISTRATION_FEE_LABEL.into(),
                    quantity: Decimal::ONE,
                    unit_price: Money {
                        amount: conf.administration_fee,
                        currency: conf.currency,
                    },
                },
            ],
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(invoice.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(invoice)
    }
}

/// Error of [`PropertySold`] [`Billing`].
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Sold [`Property`] has no buyer to invoice.
    #[display("`Property(id: {_0})` has no buyer to invoice")]
    NoBuyer(#[error(not(source))] property::Id),

    /// Selling fee of the sold [`Property`] cannot be represented.
    #[display("Selling fee of `Property(id: {_0})` overflows")]
    FeeOverflow(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{operations::Perform, Money};
    use rust_decimal::Decimal;

    use crate::{
        domain::{partner, property},
        infra::Memory,
        Billing as _, Config, Service,
    };

    use super::{
        ExecutionError, PropertySold, ADMINISTRATION_FEE_LABEL,
        SELLING_FEE_LABEL,
    };

    #[tokio::test]
    async fn invoices_selling_fee_and_administration_fee() {
        let svc = Service::new(Config::default(), Memory::new());

        let invoice = svc
            .execute(Perform(PropertySold {
                property_id: property::Id::new(),
                buyer_id: Some(partner::Id::new()),
                selling_price: property::Price::new(Decimal::from(90_000))
                    .unwrap(),
            }))
            .await
            .unwrap();

        let lines = invoice
            .lines
            .iter()
            .map(|l| (l.label.as_str(), l.quantity, l.unit_price))
            .collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                (
                    SELLING_FEE_LABEL,
                    Decimal::ONE,
                    Money::from_str("5400USD").unwrap(),
                ),
                (
                    ADMINISTRATION_FEE_LABEL,
                    Decimal::ONE,
                    Money::from_str("100USD").unwrap(),
                ),
            ],
        );
        assert_eq!(invoice.journal.to_string(), "INV");
        assert_eq!(invoice.total(), Some(Money::from_str("5500USD").unwrap()));
    }

    #[tokio::test]
    async fn refuses_to_invoice_without_buyer() {
        let svc = Service::new(Config::default(), Memory::new());

        let res = svc
            .execute(Perform(PropertySold {
                property_id: property::Id::new(),
                buyer_id: None,
                selling_price: property::Price::ZERO,
            }))
            .await;

        assert!(res.is_err());
    }

    #[tokio::test]
    async fn refuses_to_invoice_overflowing_fee() {
        let svc = Service::new(Config::default(), Memory::new());
        let property_id = property::Id::new();

        let err = svc
            .execute(Perform(PropertySold {
                property_id,
                buyer_id: Some(partner::Id::new()),
                selling_price: property::Price::new(Decimal::MAX).unwrap(),
            }))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::FeeOverflow(id) if *id == property_id,
        ));
    }
}
