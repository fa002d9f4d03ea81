use crate::error::{Error, Result};
use crate::model::{Entity, Film, User};
use sled::transaction::{
    abort, ConflictableTransactionResult, TransactionError, TransactionResult, TransactionalTree,
};
use sled::Transactional;
use std::marker::PhantomData;
use std::sync::Arc;

/// Holds the highest id handed out per collection.
const IDS: &'static [u8] = b"ids";

// Big-endian so that sled iterates entities in ascending id order.
fn serialize_id(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

fn deserialize_id<V: AsRef<[u8]>>(id: V) -> Result<u64> {
    use std::convert::TryInto;
    let bytes = id
        .as_ref()
        .try_into()
        .map_err(|_| Error::Internal("stored id is not 8 bytes long".to_owned()))?;
    Ok(u64::from_be_bytes(bytes))
}

fn decode<E: Entity>(bytes: &[u8]) -> Result<E> {
    Ok(bincode::deserialize(bytes)?)
}

fn encode<E: Entity>(entity: &E) -> Result<Vec<u8>> {
    Ok(bincode::serialize(entity)?)
}

type TxResult<T> = ConflictableTransactionResult<T, Error>;

fn finish<T>(result: TransactionResult<T, Error>) -> Result<T> {
    result.map_err(|err| match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => Error::Storage(e),
    })
}

fn tx_get<E: Entity>(tree: &TransactionalTree, id: u64) -> TxResult<E> {
    match tree.get(serialize_id(id))? {
        Some(bytes) => decode(&bytes).or_else(abort),
        None => abort(Error::not_found(E::KIND, id)),
    }
}

fn tx_put<E: Entity>(tree: &TransactionalTree, entity: &E) -> TxResult<()> {
    let bytes = encode(entity).or_else(abort)?;
    tree.insert(&serialize_id(entity.id())[..], bytes)?;
    Ok(())
}

fn tx_last_id(ids: &TransactionalTree, collection: &str) -> TxResult<u64> {
    match ids.get(collection)? {
        Some(bytes) => deserialize_id(bytes).or_else(abort),
        None => Ok(0),
    }
}

/// Storage capability the services are written against.
///
/// Every method either fully applies or leaves the store untouched.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Fails with `NotFound` if there is no entity with this id.
    fn get(&self, id: u64) -> Result<E>;

    /// Inserts or overwrites by id.
    fn put(&self, entity: &E) -> Result<()>;

    fn exists(&self, id: u64) -> Result<bool>;

    /// Snapshot of all entities in ascending id order.
    fn values(&self) -> Result<Vec<E>>;

    /// `max(existing ids) + 1`, or 1 for an empty collection.
    fn next_id(&self) -> Result<u64>;

    /// Allocates the next id and stores `build(id)` in one step.
    fn create(&self, build: &dyn Fn(u64) -> E) -> Result<E>;

    /// Read-modify-write of one entity. Nothing is written if `apply` fails.
    fn update(&self, id: u64, apply: &dyn Fn(&mut E) -> Result<()>) -> Result<E>;

    /// Like `update`, but for two distinct entities at once.
    fn update_pair(
        &self,
        a: u64,
        b: u64,
        apply: &dyn Fn(&mut E, &mut E) -> Result<()>,
    ) -> Result<(E, E)>;
}

pub type Store<E> = Arc<dyn EntityStore<E>>;

/// [`EntityStore`] backed by one tree of a sled database.
pub struct TreeStore<E> {
    entities: sled::Tree,
    ids: sled::Tree,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> TreeStore<E> {
    pub fn open(db: &sled::Db) -> sled::Result<Self> {
        Ok(TreeStore {
            entities: db.open_tree(E::COLLECTION)?,
            ids: db.open_tree(IDS)?,
            _entity: PhantomData,
        })
    }
}

impl<E: Entity> EntityStore<E> for TreeStore<E> {
    fn get(&self, id: u64) -> Result<E> {
        let bytes = self
            .entities
            .get(serialize_id(id))?
            .ok_or_else(|| Error::not_found(E::KIND, id))?;
        decode(&bytes)
    }

    fn put(&self, entity: &E) -> Result<()> {
        finish(
            (&self.entities, &self.ids).transaction(|(entities, ids)| -> TxResult<()> {
                tx_put(entities, entity)?;
                if entity.id() > tx_last_id(ids, E::COLLECTION)? {
                    ids.insert(E::COLLECTION, &serialize_id(entity.id())[..])?;
                }
                Ok(())
            }),
        )
    }

    fn exists(&self, id: u64) -> Result<bool> {
        Ok(self.entities.contains_key(serialize_id(id))?)
    }

    fn values(&self) -> Result<Vec<E>> {
        self.entities
            .iter()
            .values()
            .map(|bytes| -> Result<E> { decode(&bytes?) })
            .collect()
    }

    fn next_id(&self) -> Result<u64> {
        match self.ids.get(E::COLLECTION)? {
            Some(bytes) => Ok(deserialize_id(bytes)? + 1),
            None => Ok(1),
        }
    }

    fn create(&self, build: &dyn Fn(u64) -> E) -> Result<E> {
        finish(
            (&self.entities, &self.ids).transaction(|(entities, ids)| -> TxResult<E> {
                let id = tx_last_id(ids, E::COLLECTION)? + 1;
                let entity = build(id);
                tx_put(entities, &entity)?;
                ids.insert(E::COLLECTION, &serialize_id(id)[..])?;
                Ok(entity)
            }),
        )
    }

    fn update(&self, id: u64, apply: &dyn Fn(&mut E) -> Result<()>) -> Result<E> {
        finish(self.entities.transaction(|entities| -> TxResult<E> {
            let mut entity: E = tx_get(entities, id)?;
            apply(&mut entity).or_else(abort)?;
            tx_put(entities, &entity)?;
            Ok(entity)
        }))
    }

    fn update_pair(
        &self,
        a: u64,
        b: u64,
        apply: &dyn Fn(&mut E, &mut E) -> Result<()>,
    ) -> Result<(E, E)> {
        if a == b {
            return Err(Error::Internal(format!(
                "pair update on a single {} {}",
                E::KIND,
                a
            )));
        }
        finish(self.entities.transaction(|entities| -> TxResult<(E, E)> {
            let mut first: E = tx_get(entities, a)?;
            let mut second: E = tx_get(entities, b)?;
            apply(&mut first, &mut second).or_else(abort)?;
            tx_put(entities, &first)?;
            tx_put(entities, &second)?;
            Ok((first, second))
        }))
    }
}

/// The film and user collections of one database.
#[derive(Clone)]
pub struct Stores {
    pub films: Store<Film>,
    pub users: Store<User>,
}

impl Stores {
    pub fn open(db: &sled::Db) -> sled::Result<Self> {
        Ok(Stores {
            films: Arc::new(TreeStore::<Film>::open(db)?),
            users: Arc::new(TreeStore::<User>::open(db)?),
        })
    }

    /// Stores living only as long as the process.
    pub fn temporary() -> sled::Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::open(&db)
    }
}
