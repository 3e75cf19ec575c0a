//! Typed wrappers for Orchestrator documents and the endpoint groups
//! returning them
//!
//! Every document is held by a [`ResourceObject`], parameterized by a marker
//! type naming its kind. The well-known `uuid` and `id` fields are typed;
//! everything else the server sends is kept in an `extra` mapping so new
//! fields survive a round trip.

use std::fmt;
use std::marker::PhantomData;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{Error, Result};

mod deployment_resources;
mod deployments;
mod info;

pub use deployment_resources::Resources;
pub use deployments::{DeploymentRequest, Deployments};
pub use info::{Config, Info};

/// The kinds of documents returned by the Orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Deployment,
    Resource,
    ToscaTemplate,
    OrchestratorInfo,
    OrchestratorConfiguration,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Deployment => "Deployment",
            ObjectKind::Resource => "Resource",
            ObjectKind::ToscaTemplate => "TOSCATemplate",
            ObjectKind::OrchestratorInfo => "OrchestratorInfo",
            ObjectKind::OrchestratorConfiguration => "OrchestratorConfiguration",
        };
        f.write_str(name)
    }
}

/// Marker trait tying a wrapper type to its [`ObjectKind`]
pub trait ResourceKind: fmt::Debug + Clone + Copy + Send + Sync + 'static {
    const KIND: ObjectKind;
}

/// Kind markers
pub mod kind {
    use super::{ObjectKind, ResourceKind};

    macro_rules! kinds {
        ($($name:ident),* $(,)?) => {
            $(
                #[derive(Debug, Clone, Copy, PartialEq, Eq)]
                pub struct $name;

                impl ResourceKind for $name {
                    const KIND: ObjectKind = ObjectKind::$name;
                }
            )*
        };
    }

    kinds!(
        Deployment,
        Resource,
        ToscaTemplate,
        OrchestratorInfo,
        OrchestratorConfiguration,
    );
}

pub type Deployment = ResourceObject<kind::Deployment>;
pub type Resource = ResourceObject<kind::Resource>;
pub type ToscaTemplate = ResourceObject<kind::ToscaTemplate>;
pub type OrchestratorInfo = ResourceObject<kind::OrchestratorInfo>;
pub type OrchestratorConfiguration = ResourceObject<kind::OrchestratorConfiguration>;

/// A document returned by the Orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObject<K: ResourceKind> {
    pub uuid: Option<String>,
    pub id: Option<Value>,
    /// Every other top-level key
    pub extra: Map<String, Value>,
    kind: PhantomData<K>,
}

impl<K: ResourceKind> ResourceObject<K> {
    /// Wrap a JSON document; it must be a mapping
    pub fn from_json(document: Value) -> Result<Self> {
        match document {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(Error::invalid_usage(format!(
                "{} must be a JSON object, got {}",
                K::KIND,
                other
            ))),
        }
    }

    /// Wrap a mapping
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut object = Self {
            uuid: None,
            id: None,
            extra: Map::new(),
            kind: PhantomData,
        };
        for (key, value) in map {
            object.insert(key, value);
        }
        object
    }

    pub fn kind(&self) -> ObjectKind {
        K::KIND
    }

    /// Set a top-level field
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match (key.as_str(), value) {
            ("uuid", Value::String(uuid)) => self.uuid = Some(uuid),
            ("id", id) if !id.is_null() => self.id = Some(id),
            (_, value) => {
                self.extra.insert(key, value);
            }
        }
    }

    /// A top-level field by name
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "uuid" if self.uuid.is_some() => self.uuid.clone().map(Value::String),
            "id" if self.id.is_some() => self.id.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// A top-level string field
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// The full document
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(uuid) = &self.uuid {
            map.insert("uuid".to_string(), Value::String(uuid.clone()));
        }
        if let Some(id) = &self.id {
            map.insert("id".to_string(), id.clone());
        }
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }

    /// Top-level keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.extra.keys().cloned().collect();
        if self.uuid.is_some() {
            keys.push("uuid".to_string());
        }
        if self.id.is_some() {
            keys.push("id".to_string());
        }
        keys.sort();
        keys
    }

    /// Whether two objects denote the same Orchestrator entity.
    ///
    /// Objects of different kinds never match. Otherwise `id` is compared
    /// when both sides have one, then `uuid`, then the whole document.
    pub fn same_as<O: ResourceKind>(&self, other: &ResourceObject<O>) -> bool {
        if K::KIND != O::KIND {
            return false;
        }
        if let (Some(a), Some(b)) = (&self.id, &other.id) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.uuid, &other.uuid) {
            return a == b;
        }
        self.to_json() == other.to_json()
    }
}

impl<K: ResourceKind> Serialize for ResourceObject<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<K: ResourceKind> fmt::Display for ResourceObject<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .keys()
            .into_iter()
            .map(|k| {
                let value = self.get_str(&k).unwrap_or_else(|| "None".to_string());
                format!("{}={}", k, value)
            })
            .collect();
        write!(f, "<{} {}>", K::KIND, fields.join(", "))
    }
}
