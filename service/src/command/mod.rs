//! [`Command`] definition.

pub mod accept_offer;
pub mod authorize_user_session;
pub mod create_offer;
pub mod create_partner;
pub mod create_property;
pub mod create_property_tag;
pub mod create_property_type;
pub mod create_user;
pub mod create_user_session;
pub mod delete_property;
pub mod mark_property_cancelled;
pub mod mark_property_sold;
pub mod refuse_offer;
pub mod set_offer_deadline;
pub mod set_offer_validity;
pub mod update_property;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_offer::AcceptOffer, authorize_user_session::AuthorizeUserSession,
    create_offer::CreateOffer, create_partner::CreatePartner,
    create_property::CreateProperty, create_property_tag::CreatePropertyTag,
    create_property_type::CreatePropertyType, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_property::DeleteProperty,
    mark_property_cancelled::MarkPropertyCancelled,
    mark_property_sold::MarkPropertySold, refuse_offer::RefuseOffer,
    set_offer_deadline::SetOfferDeadline,
    set_offer_validity::SetOfferValidity, update_property::UpdateProperty,
};

#[cfg(test)]
pub(crate) mod fixture {
    //! Helpers for setting up a [`Service`] in [`Command`] tests.

    use jsonwebtoken::{DecodingKey, EncodingKey};
    use rust_decimal::Decimal;
    use secrecy::SecretBox;

    use crate::{
        domain::{partner, property, user, Offer, Partner, Property, User},
        infra::Memory,
        Config, Service,
    };

    use super::{
        Command as _, CreateOffer, CreatePartner, CreateProperty, CreateUser,
    };

    /// [`Service`] backed by a fresh [`Memory`] database.
    pub(crate) fn service() -> Service<Memory> {
        let config = Config {
            jwt_encoding_key: EncodingKey::from_secret(b"secret"),
            jwt_decoding_key: DecodingKey::from_secret(b"secret"),
            ..Config::default()
        };
        Service::new(config, Memory::new())
    }

    pub(crate) async fn user(svc: &Service<Memory>, login: &str) -> User {
        svc.execute(CreateUser {
            name: user::Name::new("Jane Doe").unwrap(),
            login: user::Login::new(login).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("password").unwrap(),
            )),
        })
        .await
        .unwrap()
    }

    pub(crate) async fn partner(svc: &Service<Memory>) -> Partner {
        svc.execute(CreatePartner {
            name: partner::Name::new("Buyer Ltd").unwrap(),
        })
        .await
        .unwrap()
    }

    pub(crate) fn draft(
        salesperson_id: user::Id,
        expected_price: i64,
    ) -> CreateProperty {
        CreateProperty {
            name: property::Name::new("Cozy cottage").unwrap(),
            description: property::Description::new("Near the lake").unwrap(),
            type_id: None,
            tag_ids: vec![],
            postcode: None,
            available_from: None,
            expected_price: Decimal::from(expected_price),
            bedrooms: None,
            living_area: Decimal::from(120),
            facades: 2,
            has_garage: false,
            has_garden: false,
            garden_area: None,
            garden_orientation: None,
            is_garden_walled: false,
            salesperson_id,
        }
    }

    pub(crate) async fn property(
        svc: &Service<Memory>,
        expected_price: i64,
    ) -> Property {
        let seller = user(svc, "seller").await;
        svc.execute(draft(seller.id, expected_price)).await.unwrap()
    }

    pub(crate) async fn offer(
        svc: &Service<Memory>,
        property_id: property::Id,
        price: i64,
    ) -> Offer {
        let partner = partner(svc).await;
        svc.execute(CreateOffer {
            property_id,
            partner_id: partner.id,
            price: Decimal::from(price),
            validity: None,
        })
        .await
        .unwrap()
    }
}
