//! In-memory [`Database`] implementation.
//!
//! Transactions are serialized: a [`Transact`]ed [`Memory`] works on its own
//! copy of the data, published on [`Commit`] and discarded on drop.

#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::{collections::HashMap, future::Future, sync::Arc};

use common::operations::{By, Commit, Delete, Insert, Lock, Select, Transact};
use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracerr::Traced;

use crate::{
    domain::{
        invoice, offer, partner, property, property_tag, property_type, user,
        Invoice, Offer, Partner, Property, PropertyTag, PropertyType, User,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`].
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following [`Invoice`] insertion fail (or succeed again).
    #[cfg(test)]
    pub(crate) fn reject_invoices(&self, reject: bool) {
        self.0 .0.reject_invoices.store(reject, Ordering::SeqCst);
    }
}

/// [`Memory`] error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Invoice`] insertion is rejected via [`Memory::reject_invoices()`].
    #[cfg(test)]
    #[display("`Invoice` insertion is rejected")]
    InvoiceRejected,
}

/// Data kept by a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Partner`]s.
    partners: HashMap<partner::Id, Partner>,

    /// Stored [`PropertyType`]s.
    property_types: HashMap<property_type::Id, PropertyType>,

    /// Stored [`PropertyTag`]s.
    property_tags: HashMap<property_tag::Id, PropertyTag>,

    /// Stored [`Property`]s.
    properties: HashMap<property::Id, Property>,

    /// Stored [`Offer`]s.
    offers: HashMap<offer::Id, Offer>,

    /// Stored [`Invoice`]s.
    invoices: HashMap<invoice::Id, Invoice>,
}

impl Store {
    /// Returns the [`Offer`]s of the [`Property`] with the provided ID in
    /// their creation order.
    fn offers_of(&self, property_id: property::Id) -> Vec<Offer> {
        let mut offers = self
            .offers
            .values()
            .filter(|o| o.property_id == property_id)
            .cloned()
            .collect::<Vec<_>>();
        offers.sort_by_key(|o| (o.created_at, o.id));
        offers
    }

    /// Checks whether the provided [`Property`] passes the `filter`.
    fn matches(
        &self,
        property: &Property,
        filter: &read::property::list::Filter,
    ) -> bool {
        let read::property::list::Filter {
            name,
            state,
            best_price,
            with_inactive,
        } = filter;

        if !with_inactive && !property.is_active {
            return false;
        }
        if state.is_some_and(|s| s != property.state) {
            return false;
        }
        if let Some(name) = name {
            let haystack =
                AsRef::<str>::as_ref(&property.name).to_lowercase();
            let mut words = AsRef::<str>::as_ref(name).split_whitespace();
            if !words.any(|w| haystack.contains(&w.to_lowercase())) {
                return false;
            }
        }
        if let Some(cond) = best_price {
            let offers = self.offers_of(property.id);
            if !cond.matches(property::best_price(&offers)) {
                return false;
            }
        }
        true
    }
}

/// State shared by all the clones of a [`Memory`] database.
#[derive(Debug, Default)]
pub struct Shared {
    /// Committed data.
    store: RwLock<Store>,

    /// Guard serializing write access.
    serial: Arc<Mutex<()>>,

    /// Indicator whether [`Invoice`] insertions should fail.
    #[cfg(test)]
    reject_invoices: AtomicBool,
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx(Arc<Shared>);

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx(Arc<TxInner>);

/// Inner representation of a [`Tx`] client.
#[derive(Debug)]
struct TxInner {
    /// State of the [`Memory`] database this [`Tx`] was started from.
    shared: Arc<Shared>,

    /// Data modified by this [`Tx`], not visible outside until committed.
    staged: RwLock<Store>,

    /// Exclusive write access, released on commit or drop.
    guard: Mutex<Option<OwnedMutexGuard<()>>>,
}

/// Access to the [`Store`] of a [`Memory`] database.
pub trait Connection {
    /// Reads the [`Store`] with the provided function.
    fn inspect<R>(
        &self,
        f: impl FnOnce(&Store) -> R,
    ) -> impl Future<Output = R>;

    /// Modifies the [`Store`] with the provided function.
    fn modify<R>(
        &self,
        f: impl FnOnce(&mut Store) -> R,
    ) -> impl Future<Output = R>;

    /// Returns the [`Shared`] state of the [`Memory`] database.
    fn shared(&self) -> &Shared;
}

impl Connection for NonTx {
    async fn inspect<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&*self.0.store.read().await)
    }

    async fn modify<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        let _serial = self.0.serial.lock().await;
        f(&mut *self.0.store.write().await)
    }

    fn shared(&self) -> &Shared {
        &self.0
    }
}

impl Connection for Tx {
    async fn inspect<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&*self.0.staged.read().await)
    }

    async fn modify<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut *self.0.staged.write().await)
    }

    fn shared(&self) -> &Shared {
        &self.0.shared
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let shared = Arc::clone(&self.0 .0);
        let guard = Arc::clone(&shared.serial).lock_owned().await;
        let staged = shared.store.read().await.clone();
        Ok(Memory(Tx(Arc::new(TxInner {
            shared,
            staged: RwLock::new(staged),
            guard: Mutex::new(Some(guard)),
        }))))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let inner = &self.0 .0;
        let mut guard = inner.guard.lock().await;
        if guard.is_some() {
            *inner.shared.store.write().await =
                inner.staged.read().await.clone();
            drop(guard.take());
        }
        Ok(())
    }
}

impl<C: Connection> Database<Select<By<Option<User>, user::Id>>> for Memory<C> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.inspect(|s| s.users.get(&id).cloned()).await)
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Login>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        Ok(self
            .inspect(|s| s.users.values().find(|u| &u.login == login).cloned())
            .await)
    }
}

impl<C: Connection> Database<Insert<User>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.modify(|s| drop(s.users.insert(user.id, user))).await;
        Ok(())
    }
}

impl<C: Connection> Database<Select<By<Option<Partner>, partner::Id>>>
    for Memory<C>
{
    type Ok = Option<Partner>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Partner>, partner::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.inspect(|s| s.partners.get(&id).cloned()).await)
    }
}

impl<C: Connection> Database<Insert<Partner>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(partner): Insert<Partner>,
    ) -> Result<Self::Ok, Self::Err> {
        self.modify(|s| drop(s.partners.insert(partner.id, partner)))
            .await;
        Ok(())
    }
}

impl<C: Connection>
    Database<Select<By<Option<PropertyType>, property_type::Id>>>
    for Memory<C>
{
    type Ok = Option<PropertyType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyType>, property_type::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.inspect(|s| s.property_types.get(&id).cloned()).await)
    }
}

impl<'n, C: Connection>
    Database<Select<By<Option<PropertyType>, &'n property_type::Name>>>
    for Memory<C>
{
    type Ok = Option<PropertyType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyType>, &'n property_type::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();
        Ok(self
            .inspect(|s| {
                s.property_types.values().find(|t| &t.name == name).cloned()
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<PropertyType>, ()>>> for Memory<C> {
    type Ok = Vec<PropertyType>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<PropertyType>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut types = self
            .inspect(|s| s.property_types.values().cloned().collect::<Vec<_>>())
            .await;
        types.sort_by(|a, b| {
            let (a, b): (&str, &str) = (a.name.as_ref(), b.name.as_ref());
            a.cmp(b)
        });
        Ok(types)
    }
}

impl<C: Connection> Database<Insert<PropertyType>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(ty): Insert<PropertyType>,
    ) -> Result<Self::Ok, Self::Err> {
        self.modify(|s| drop(s.property_types.insert(ty.id, ty))).await;
        Ok(())
    }
}

impl<C: Connection> Database<Select<By<Option<PropertyTag>, property_tag::Id>>>
    for Memory<C>
{
    type Ok = Option<PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyTag>, property_tag::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.inspect(|s| s.property_tags.get(&id).cloned()).await)
    }
}

impl<'n, C: Connection>
    Database<Select<By<Option<PropertyTag>, &'n property_tag::Name>>>
    for Memory<C>
{
    type Ok = Option<PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<PropertyTag>, &'n property_tag::Name>>,
    ) -> Result<Self::Ok, Self::Err> {
        let name = by.into_inner();
        Ok(self
            .inspect(|s| {
                s.property_tags.values().find(|t| &t.name == name).cloned()
            })
            .await)
    }
}

impl<C, IDs>
    Database<Select<By<HashMap<property_tag::Id, PropertyTag>, IDs>>>
    for Memory<C>
where
    C: Connection,
    IDs: AsRef<[property_tag::Id]>,
{
    type Ok = HashMap<property_tag::Id, PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property_tag::Id, PropertyTag>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .inspect(|s| {
                ids.as_ref()
                    .iter()
                    .filter_map(|id| {
                        s.property_tags.get(id).map(|t| (*id, t.clone()))
                    })
                    .collect()
            })
            .await)
    }
}

impl<C: Connection> Database<Select<By<Vec<PropertyTag>, ()>>> for Memory<C> {
    type Ok = Vec<PropertyTag>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<PropertyTag>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut tags = self
            .inspect(|s| s.property_tags.values().cloned().collect::<Vec<_>>())
            .await;
        tags.sort_by(|a, b| {
            let (a, b): (&str, &str) = (a.name.as_ref(), b.name.as_ref());
            a.cmp(b)
        });
        Ok(tags)
    }
}

impl<C: Connection> Database<Insert<PropertyTag>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tag): Insert<PropertyTag>,
    ) -> Result<Self::Ok, Self::Err> {
        self.modify(|s| drop(s.property_tags.insert(tag.id, tag))).await;
        Ok(())
    }
}

impl<C: Connection> Database<Select<By<Option<Property>, property::Id>>>
    for Memory<C>
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.inspect(|s| s.properties.get(&id).cloned()).await)
    }
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Property>, IDs>>>
    for Memory<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Property>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .inspect(|s| {
                ids.as_ref()
                    .iter()
                    .filter_map(|id| {
                        s.properties.get(id).map(|p| (*id, p.clone()))
                    })
                    .collect()
            })
            .await)
    }
}

impl<C: Connection> Database<Insert<Property>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.modify(|s| drop(s.properties.insert(property.id, property)))
            .await;
        Ok(())
    }
}

impl<C: Connection> Database<Delete<By<Property, property::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.modify(|s| {
            drop(s.properties.remove(&id));
            s.offers.retain(|_, o| o.property_id != id);
        })
        .await;
        Ok(())
    }
}

impl<C: Connection> Database<Lock<By<Property, property::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Write access is exclusive for the whole transaction already.
        Ok(())
    }
}

impl<C>
    Database<
        Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    > for Memory<C>
where
    C: Connection,
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use common::pagination::Direction;

        let read::property::list::Selector { arguments, filter } =
            by.into_inner();
        let direction = arguments.direction();
        let cursor = arguments.cursor().copied();

        let mut ids = self
            .inspect(|s| {
                s.properties
                    .values()
                    .filter(|p| s.matches(p, &filter))
                    .map(|p| p.id)
                    .filter(|id| {
                        cursor.map_or(true, |c| match direction {
                            Direction::Forward => *id > c,
                            Direction::Backward => *id < c,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .await;
        ids.sort_unstable();
        if direction == Direction::Backward {
            ids.reverse();
        }

        let has_more = ids.len() > arguments.limit();
        let edges = ids
            .into_iter()
            .take(arguments.limit())
            .map(|id| (id, id))
            .collect::<Vec<_>>();

        Ok(read::property::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C>
    Database<
        Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    > for Memory<C>
where
    C: Connection,
{
    type Ok = read::property::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .inspect(|s| {
                s.properties.values().filter(|p| s.matches(p, &filter)).count()
            })
            .await;
        Ok(i32::try_from(count).unwrap_or(i32::MAX).into())
    }
}

impl<C> Database<Select<By<read::property::ActiveListings, user::Id>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = read::property::ActiveListings;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::property::ActiveListings, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        let mut listings = self
            .inspect(|s| {
                s.properties
                    .values()
                    .filter(|p| {
                        p.salesperson_id == user_id && p.is_active_listing()
                    })
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        listings.sort_by_key(|p| (p.created_at, p.id));
        Ok(listings.into())
    }
}

impl<C: Connection> Database<Select<By<Option<Offer>, offer::Id>>>
    for Memory<C>
{
    type Ok = Option<Offer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Offer>, offer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.inspect(|s| s.offers.get(&id).cloned()).await)
    }
}

impl<C: Connection> Database<Select<By<Vec<Offer>, property::Id>>>
    for Memory<C>
{
    type Ok = Vec<Offer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Offer>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.inspect(|s| s.offers_of(id)).await)
    }
}

impl<C: Connection> Database<Insert<Offer>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(offer): Insert<Offer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.modify(|s| drop(s.offers.insert(offer.id, offer))).await;
        Ok(())
    }
}

impl<C: Connection> Database<Select<By<Vec<Invoice>, property::Id>>>
    for Memory<C>
{
    type Ok = Vec<Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Invoice>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut invoices = self
            .inspect(|s| {
                s.invoices
                    .values()
                    .filter(|i| i.property_id == id)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        invoices.sort_by_key(|i| (i.created_at, i.id));
        Ok(invoices)
    }
}

impl<C: Connection> Database<Insert<Invoice>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(invoice): Insert<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        #[cfg(test)]
        if self.shared().reject_invoices.load(Ordering::SeqCst) {
            return Err(tracerr::new!(database::Error::from(
                Error::InvoiceRejected
            )));
        }
        self.modify(|s| drop(s.invoices.insert(invoice.id, invoice)))
            .await;
        Ok(())
    }
}
