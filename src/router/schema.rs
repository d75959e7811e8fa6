//! Parameter record schemas.
//!
//! A schema describes the record a chain binds into: which destination
//! names exist, their semantic kind, how to write a converted segment into
//! a record, and how to allocate a zero-valued record.
//!
//! # Design Decisions
//! - Fields are registered explicitly, once, at route registration time
//! - Setters receive the raw segment text and do their own width-checked
//!   parsing, so a record field can never be written with an out-of-range
//!   value
//! - Schemas are shared through `Arc` between the chains that use them

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::router::binder::{self, FieldKind, Integer, ParamValue};
use crate::router::error::ConversionError;

type Setter<P> = Box<dyn Fn(&mut P, &str) -> Result<(), ConversionError> + Send + Sync>;
type Allocator<P> = Box<dyn Fn() -> P + Send + Sync>;

/// One declared field.
pub struct FieldSpec<P> {
    kind: FieldKind,
    setter: Option<Setter<P>>,
}

impl<P> FieldSpec<P> {
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// Declared shape of a parameter record.
pub struct ParamSchema<P> {
    name: String,
    fields: BTreeMap<String, FieldSpec<P>>,
    allocate: Allocator<P>,
}

impl<P: Default + 'static> ParamSchema<P> {
    /// Create an empty schema whose records start as `P::default()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_allocator(name, P::default)
    }
}

impl<P: 'static> ParamSchema<P> {
    /// Create an empty schema with a custom zero-value allocator.
    pub fn with_allocator(
        name: impl Into<String>,
        allocate: impl Fn() -> P + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            allocate: Box::new(allocate),
        }
    }

    /// Register a string field.
    pub fn string(
        mut self,
        name: impl Into<String>,
        set: impl Fn(&mut P, String) + Send + Sync + 'static,
    ) -> Self {
        self.fields.insert(
            name.into(),
            FieldSpec {
                kind: FieldKind::String,
                setter: Some(Box::new(move |record: &mut P, text: &str| {
                    set(record, text.to_string());
                    Ok(())
                })),
            },
        );
        self
    }

    /// Register an integer field of width `T`.
    pub fn integer<T: Integer>(
        mut self,
        name: impl Into<String>,
        set: impl Fn(&mut P, T) + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let field = name.clone();
        self.fields.insert(
            name,
            FieldSpec {
                kind: FieldKind::Integer(T::KIND),
                setter: Some(Box::new(move |record: &mut P, text: &str| {
                    set(record, binder::parse_integer::<T>(&field, text)?);
                    Ok(())
                })),
            },
        );
        self
    }

    /// Register a field that exists on the record but cannot be bound.
    pub fn opaque(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.insert(
            name.into(),
            FieldSpec {
                kind: FieldKind::Unsupported(type_name.into()),
                setter: None,
            },
        );
        self
    }
}

impl<P> ParamSchema<P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec<P>> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldKind)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), &field.kind))
    }

    /// A fresh zero-valued record.
    pub fn allocate(&self) -> P {
        (self.allocate)()
    }

    /// Convert `text` and write it into `record`.
    pub fn bind(&self, record: &mut P, name: &str, text: &str) -> Result<(), ConversionError> {
        let setter = self
            .fields
            .get(name)
            .and_then(|field| field.setter.as_ref())
            .ok_or_else(|| ConversionError {
                name: name.to_string(),
                value: text.to_string(),
                expected: "string or integer",
                reason: "field is not bindable".to_string(),
            })?;
        setter(record, text)
    }
}

impl<P> fmt::Debug for ParamSchema<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSchema")
            .field("name", &self.name)
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|(name, field)| (name, &field.kind))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A parameter record declared at runtime, e.g. from a route file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DynParams(BTreeMap<String, ParamValue>);

impl DynParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(ParamValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl ParamSchema<DynParams> {
    /// Build a schema from `(name, kind)` pairs.
    ///
    /// Records start with every bindable field set to its zero value.
    pub fn dynamic<I, S>(name: impl Into<String>, fields: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (S, FieldKind)>,
        S: Into<String>,
    {
        let fields: Vec<(String, FieldKind)> = fields
            .into_iter()
            .map(|(name, kind)| (name.into(), kind))
            .collect();

        let zero: BTreeMap<String, ParamValue> = fields
            .iter()
            .filter_map(|(name, kind)| ParamValue::zero(kind).map(|v| (name.clone(), v)))
            .collect();

        let mut schema = Self::with_allocator(name, move || DynParams(zero.clone()));

        for (name, kind) in fields {
            let setter: Option<Setter<DynParams>> = if kind.is_bindable() {
                let field = name.clone();
                let field_kind = kind.clone();
                Some(Box::new(move |record: &mut DynParams, text: &str| {
                    let value = binder::convert(&field, &field_kind, text)?;
                    record.0.insert(field.clone(), value);
                    Ok(())
                }))
            } else {
                None
            };
            schema.fields.insert(name, FieldSpec { kind, setter });
        }

        Arc::new(schema)
    }
}
