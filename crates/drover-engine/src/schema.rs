//! Command parameter schemas: declaration, validation, and the binding
//! context the binder executes against.
//!
//! A [`ModelSchema`] is a builder over the fields of some parameter
//! struct `M`. Each [`Field`] pairs a setter closure with a binding
//! declaration (a position or a set of aliases). [`ModelSchema::validate`]
//! checks the whole declaration once and compiles it into a
//! [`BindingContext`], the precomputed form the binder walks per line.
//! Validation failures are [`SchemaError`]s and mean the command can
//! never work; the registry refuses such commands at registration.
//!
//! ```
//! use drover_engine::{Field, ModelSchema};
//!
//! #[derive(Default)]
//! struct Move {
//!     target: String,
//!     speed: f64,
//!     urgent: bool,
//! }
//!
//! let context = ModelSchema::new()
//!     .field(Field::value("target", |m: &mut Move, v: String| m.target = v).positional(0))
//!     .field(Field::value("speed", |m: &mut Move, v: f64| m.speed = v).named(&["speed", "s"]))
//!     .field(Field::value("urgent", |m: &mut Move, v: bool| m.urgent = v).named(&[]))
//!     .validate()
//!     .unwrap();
//!
//! assert_eq!(context.positional_count(), 1);
//! assert_eq!(context.named_count(), 2);
//! ```

use std::any::Any;
use std::collections::HashMap;

use crate::error::SchemaError;

/// The closed set of value kinds a field can hold.
///
/// Every kind maps to exactly one token shape at binding time: `Str`
/// binds quoted strings, the numeric kinds bind numbers, `Enum` binds
/// bare words, and `Bool` binds flag presence. Mostly useful in error
/// messages and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A closed set of named members.
    Enum,
    /// An owned `String`.
    Str,
    /// `f64`.
    Double,
    /// `f32`.
    Float,
    /// `i64`.
    Long,
    /// `i32`.
    Int,
    /// `bool`, set by flag presence.
    Bool,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::Enum => "enum",
            FieldKind::Str => "string",
            FieldKind::Double => "double",
            FieldKind::Float => "float",
            FieldKind::Long => "long",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A setter closure for one field of `M` taking an already-coerced value.
type SetFn<M, T> = Box<dyn Fn(&mut M, T) + Send + Sync>;

/// A validated field setter, dispatchable by kind without further
/// downcasting. Enum setters take the member index into `names`.
pub(crate) enum Slot<M> {
    Enum {
        names: Vec<&'static str>,
        set: Box<dyn Fn(&mut M, usize) + Send + Sync>,
    },
    Str(SetFn<M, String>),
    Double(SetFn<M, f64>),
    Float(SetFn<M, f32>),
    Long(SetFn<M, i64>),
    Int(SetFn<M, i32>),
    Bool(SetFn<M, bool>),
}

impl<M> Slot<M> {
    pub(crate) fn kind(&self) -> FieldKind {
        match self {
            Slot::Enum { .. } => FieldKind::Enum,
            Slot::Str(_) => FieldKind::Str,
            Slot::Double(_) => FieldKind::Double,
            Slot::Float(_) => FieldKind::Float,
            Slot::Long(_) => FieldKind::Long,
            Slot::Int(_) => FieldKind::Int,
            Slot::Bool(_) => FieldKind::Bool,
        }
    }
}

/// The declared but not yet validated value side of a field.
///
/// Scalar setters are held type-erased until validation, which is what
/// keeps [`Field::value`] open to any `T` while the engine stays closed
/// over the kinds it can actually bind.
enum RawValue<M> {
    Scalar {
        type_name: &'static str,
        setter: Box<dyn Any + Send + Sync>,
    },
    Enum {
        names: Vec<&'static str>,
        set: Box<dyn Fn(&mut M, usize) + Send + Sync>,
    },
}

/// How a field is reached on the line.
enum BindingDecl {
    Positional { order: usize },
    Named { aliases: &'static [&'static str] },
}

/// One declared field of a parameter struct.
///
/// Built with [`Field::value`] or [`Field::enumeration`], then given a
/// binding with [`positional`](Field::positional) or
/// [`named`](Field::named). A field with neither binding fails
/// validation.
pub struct Field<M> {
    name: &'static str,
    raw: RawValue<M>,
    binding: Option<BindingDecl>,
    required: bool,
}

impl<M: 'static> Field<M> {
    /// Declare a field holding a plain value of type `T`.
    ///
    /// `T` may be any type here; validation accepts `String`, `f64`,
    /// `f32`, `i64`, `i32`, and `bool`, and rejects everything else
    /// with [`SchemaError::UnsupportedType`].
    pub fn value<T: 'static>(
        name: &'static str,
        set: impl Fn(&mut M, T) + Send + Sync + 'static,
    ) -> Self {
        let setter: SetFn<M, T> = Box::new(set);
        Field {
            name,
            raw: RawValue::Scalar {
                type_name: std::any::type_name::<T>(),
                setter: Box::new(setter),
            },
            binding: None,
            required: false,
        }
    }

    /// Declare a field over a closed set of named members.
    ///
    /// `members` pairs each accepted word with the value it stands for.
    /// Matching at bind time is case-sensitive and exact. An empty
    /// member list fails validation, as does one naming the same member
    /// twice.
    pub fn enumeration<E>(
        name: &'static str,
        members: &'static [(&'static str, E)],
        set: impl Fn(&mut M, E) + Send + Sync + 'static,
    ) -> Self
    where
        E: Clone + Send + Sync + 'static,
    {
        let names = members.iter().map(|(n, _)| *n).collect();
        Field {
            name,
            raw: RawValue::Enum {
                names,
                set: Box::new(move |model, index| set(model, members[index].1.clone())),
            },
            binding: None,
            required: false,
        }
    }

    /// Bind this field to position `order` on the line.
    ///
    /// Orders across a schema must form the exact sequence `0, 1, ..`;
    /// declaration order of the fields themselves is free.
    pub fn positional(mut self, order: usize) -> Self {
        self.binding = Some(BindingDecl::Positional { order });
        self
    }

    /// Bind this field to `-`/`--` markers under the given aliases.
    ///
    /// An empty slice means the field answers to its own name. Aliases
    /// are matched case-sensitively and must be unique across the whole
    /// schema.
    pub fn named(mut self, aliases: &'static [&'static str]) -> Self {
        self.binding = Some(BindingDecl::Named { aliases });
        self
    }

    /// Require this field to be supplied on every line.
    ///
    /// Only meaningful for named fields; positional fields are always
    /// required by construction.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Builder over the full field list of a parameter struct `M`.
pub struct ModelSchema<M> {
    fields: Vec<Field<M>>,
}

impl<M: 'static> ModelSchema<M> {
    /// Start an empty schema.
    pub fn new() -> Self {
        ModelSchema { fields: Vec::new() }
    }

    /// Add one declared field.
    pub fn field(mut self, field: Field<M>) -> Self {
        self.fields.push(field);
        self
    }

    /// Check the whole declaration and compile it for the binder.
    ///
    /// Verifies that every field has a binding and a bindable type,
    /// that positional orders are contiguous from zero, that no alias
    /// is claimed twice, and that no enumeration is empty. The checks
    /// are order-independent: fields may be declared in any order.
    pub fn validate(self) -> Result<BindingContext<M>, SchemaError> {
        let mut orders: Vec<usize> = Vec::new();
        let mut by_order: Vec<(usize, PositionalSlot<M>)> = Vec::new();
        let mut named: Vec<NamedSlot<M>> = Vec::new();
        let mut claimed: Vec<&'static str> = Vec::new();
        let mut alias_index: HashMap<&'static str, usize> = HashMap::new();

        for field in self.fields {
            let name = field.name;
            let slot = resolve_slot(field.raw, name)?;
            match field.binding {
                None => return Err(SchemaError::MissingBinding { field: name }),
                Some(BindingDecl::Positional { order }) => {
                    orders.push(order);
                    by_order.push((order, PositionalSlot { name, slot }));
                }
                Some(BindingDecl::Named { aliases }) => {
                    let aliases: Vec<&'static str> = if aliases.is_empty() {
                        vec![name]
                    } else {
                        aliases.to_vec()
                    };
                    let index = named.len();
                    for &alias in &aliases {
                        claimed.push(alias);
                        alias_index.insert(alias, index);
                    }
                    named.push(NamedSlot {
                        name,
                        slot,
                        required: field.required,
                        aliases,
                    });
                }
            }
        }

        if !orders.is_empty() {
            orders.sort_unstable();
            let contiguous = orders[0] == 0 && orders.windows(2).all(|w| w[1] == w[0] + 1);
            if !contiguous {
                return Err(SchemaError::NonContiguousOrders { orders });
            }
        }

        let mut duplicates: Vec<&'static str> = Vec::new();
        for (i, &alias) in claimed.iter().enumerate() {
            if claimed[..i].contains(&alias) && !duplicates.contains(&alias) {
                duplicates.push(alias);
            }
        }
        if !duplicates.is_empty() {
            return Err(SchemaError::DuplicateAliases {
                aliases: duplicates,
            });
        }

        by_order.sort_by_key(|(order, _)| *order);
        let positional = by_order.into_iter().map(|(_, slot)| slot).collect();

        Ok(BindingContext {
            positional,
            named,
            alias_index,
        })
    }
}

impl<M: 'static> Default for ModelSchema<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Narrow a declared value down to a bindable [`Slot`], or reject it.
fn resolve_slot<M: 'static>(
    raw: RawValue<M>,
    field: &'static str,
) -> Result<Slot<M>, SchemaError> {
    match raw {
        RawValue::Enum { names, set } => {
            if names.is_empty() {
                return Err(SchemaError::EmptyEnum { field });
            }
            let mut repeated: Vec<&'static str> = Vec::new();
            for (i, &name) in names.iter().enumerate() {
                if names[..i].contains(&name) && !repeated.contains(&name) {
                    repeated.push(name);
                }
            }
            if !repeated.is_empty() {
                return Err(SchemaError::DuplicateEnumMembers {
                    field,
                    members: repeated,
                });
            }
            Ok(Slot::Enum { names, set })
        }
        RawValue::Scalar { type_name, setter } => {
            let setter = match setter.downcast::<SetFn<M, String>>() {
                Ok(set) => return Ok(Slot::Str(*set)),
                Err(other) => other,
            };
            let setter = match setter.downcast::<SetFn<M, f64>>() {
                Ok(set) => return Ok(Slot::Double(*set)),
                Err(other) => other,
            };
            let setter = match setter.downcast::<SetFn<M, f32>>() {
                Ok(set) => return Ok(Slot::Float(*set)),
                Err(other) => other,
            };
            let setter = match setter.downcast::<SetFn<M, i64>>() {
                Ok(set) => return Ok(Slot::Long(*set)),
                Err(other) => other,
            };
            let setter = match setter.downcast::<SetFn<M, i32>>() {
                Ok(set) => return Ok(Slot::Int(*set)),
                Err(other) => other,
            };
            match setter.downcast::<SetFn<M, bool>>() {
                Ok(set) => Ok(Slot::Bool(*set)),
                Err(_) => Err(SchemaError::UnsupportedType { field, type_name }),
            }
        }
    }
}

/// A positional slot, in binding order.
pub(crate) struct PositionalSlot<M> {
    pub(crate) name: &'static str,
    pub(crate) slot: Slot<M>,
}

/// A named slot plus everything needed to report on it.
pub(crate) struct NamedSlot<M> {
    pub(crate) name: &'static str,
    pub(crate) slot: Slot<M>,
    pub(crate) required: bool,
    pub(crate) aliases: Vec<&'static str>,
}

/// The compiled, validated form of a schema.
///
/// Positional slots are stored in binding order; named slots are
/// reached through an alias map. Construction is the proof that the
/// declaration was sound, so the binder runs against this without
/// re-checking anything.
pub struct BindingContext<M> {
    pub(crate) positional: Vec<PositionalSlot<M>>,
    pub(crate) named: Vec<NamedSlot<M>>,
    pub(crate) alias_index: HashMap<&'static str, usize>,
}

impl<M> BindingContext<M> {
    /// Number of positional slots.
    pub fn positional_count(&self) -> usize {
        self.positional.len()
    }

    /// Number of named slots (not aliases; a slot may have several).
    pub fn named_count(&self) -> usize {
        self.named.len()
    }

    /// Resolve an alias to its named slot index.
    pub(crate) fn lookup(&self, alias: &str) -> Option<usize> {
        self.alias_index.get(alias).copied()
    }

    /// Every slot, positional then named.
    pub(crate) fn slots(&self) -> impl Iterator<Item = &Slot<M>> {
        self.positional
            .iter()
            .map(|p| &p.slot)
            .chain(self.named.iter().map(|n| &n.slot))
    }
}

impl<M> std::fmt::Debug for BindingContext<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Setter closures have no useful rendering; show the shape.
        let positional: Vec<&str> = self.positional.iter().map(|p| p.name).collect();
        let named: Vec<&str> = self.named.iter().map(|n| n.name).collect();
        f.debug_struct("BindingContext")
            .field("positional", &positional)
            .field("named", &named)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Sample {
        text: String,
        big: f64,
        small: f32,
        wide: i64,
        narrow: i32,
        toggle: bool,
        pick: u8,
    }

    fn full_schema() -> ModelSchema<Sample> {
        ModelSchema::new()
            .field(Field::value("text", |p: &mut Sample, v: String| p.text = v).positional(0))
            .field(Field::value("big", |p: &mut Sample, v: f64| p.big = v).positional(1))
            .field(Field::value("small", |p: &mut Sample, v: f32| p.small = v).named(&["small"]))
            .field(Field::value("wide", |p: &mut Sample, v: i64| p.wide = v).named(&["wide", "w"]))
            .field(Field::value("narrow", |p: &mut Sample, v: i32| p.narrow = v).named(&[]))
            .field(Field::value("toggle", |p: &mut Sample, v: bool| p.toggle = v).named(&["t"]))
            .field(
                Field::enumeration(
                    "pick",
                    &[("One", 1u8), ("Two", 2u8)],
                    |p: &mut Sample, v: u8| p.pick = v,
                )
                .named(&["pick"]),
            )
    }

    #[test]
    fn test_valid_schema_compiles() {
        let context = full_schema().validate().unwrap();
        assert_eq!(context.positional_count(), 2);
        assert_eq!(context.named_count(), 5);
        assert_eq!(context.lookup("w"), context.lookup("wide"));
        // Empty alias list falls back to the field name.
        assert!(context.lookup("narrow").is_some());
        assert!(context.lookup("nope").is_none());
    }

    #[test]
    fn test_positional_slots_sorted_by_order() {
        // Declared 1-then-0; compiled order must be 0-then-1.
        let context = ModelSchema::new()
            .field(Field::value("second", |p: &mut Sample, v: f64| p.big = v).positional(1))
            .field(Field::value("first", |p: &mut Sample, v: String| p.text = v).positional(0))
            .validate()
            .unwrap();
        assert_eq!(context.positional[0].name, "first");
        assert_eq!(context.positional[1].name, "second");
    }

    #[test]
    fn test_unsupported_type_is_named() {
        let err = ModelSchema::new()
            .field(
                Field::value("pause", |_: &mut Sample, _: Duration| {}).positional(0),
            )
            .validate()
            .unwrap_err();
        match err {
            SchemaError::UnsupportedType { field, type_name } => {
                assert_eq!(field, "pause");
                assert!(type_name.contains("Duration"));
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn test_unbound_field_rejected() {
        let err = ModelSchema::new()
            .field(Field::value("text", |p: &mut Sample, v: String| p.text = v))
            .validate()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingBinding { field: "text" }));
    }

    #[test]
    fn test_orders_must_start_at_zero() {
        let err = ModelSchema::new()
            .field(Field::value("a", |p: &mut Sample, v: String| p.text = v).positional(1))
            .field(Field::value("b", |p: &mut Sample, v: f64| p.big = v).positional(2))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::NonContiguousOrders { ref orders } if *orders == vec![1, 2]
        ));
    }

    #[test]
    fn test_order_gaps_and_repeats_rejected() {
        let gap = ModelSchema::new()
            .field(Field::value("a", |p: &mut Sample, v: String| p.text = v).positional(0))
            .field(Field::value("b", |p: &mut Sample, v: f64| p.big = v).positional(2))
            .validate()
            .unwrap_err();
        assert!(matches!(gap, SchemaError::NonContiguousOrders { .. }));

        let repeat = ModelSchema::new()
            .field(Field::value("a", |p: &mut Sample, v: String| p.text = v).positional(0))
            .field(Field::value("b", |p: &mut Sample, v: f64| p.big = v).positional(0))
            .validate()
            .unwrap_err();
        assert!(matches!(repeat, SchemaError::NonContiguousOrders { .. }));
    }

    #[test]
    fn test_duplicate_aliases_rejected() {
        // Two fields defaulting to the same name collide just like
        // explicit duplicates do.
        let err = ModelSchema::new()
            .field(Field::value("verbose", |p: &mut Sample, v: bool| p.toggle = v).named(&[]))
            .field(Field::value("verbose", |p: &mut Sample, v: i32| p.narrow = v).named(&[]))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateAliases { ref aliases } if *aliases == vec!["verbose"]
        ));
    }

    #[test]
    fn test_duplicate_alias_across_fields() {
        let err = ModelSchema::new()
            .field(Field::value("wide", |p: &mut Sample, v: i64| p.wide = v).named(&["w"]))
            .field(Field::value("narrow", |p: &mut Sample, v: i32| p.narrow = v).named(&["w"]))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateAliases { ref aliases } if *aliases == vec!["w"]
        ));
    }

    #[test]
    fn test_empty_enumeration_rejected() {
        let none: &'static [(&'static str, u8)] = &[];
        let err = ModelSchema::new()
            .field(Field::enumeration("pick", none, |p: &mut Sample, v| p.pick = v).named(&[]))
            .validate()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyEnum { field: "pick" }));
    }

    #[test]
    fn test_duplicate_enum_members_rejected() {
        // The first "One" would shadow the second forever.
        let twice: &'static [(&'static str, u8)] = &[("One", 1), ("Two", 2), ("One", 3)];
        let err = ModelSchema::new()
            .field(Field::enumeration("pick", twice, |p: &mut Sample, v| p.pick = v).named(&[]))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateEnumMembers { field: "pick", ref members }
                if *members == vec!["One"]
        ));
    }

    #[test]
    fn test_empty_schema_is_valid() {
        let context = ModelSchema::<Sample>::new().validate().unwrap();
        assert_eq!(context.positional_count(), 0);
        assert_eq!(context.named_count(), 0);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_send_and_sync() {
        assert_send_sync::<BindingContext<Sample>>();
    }

    #[test]
    fn test_context_debug_names_the_fields() {
        let context = full_schema().validate().unwrap();
        let rendered = format!("{context:?}");
        assert!(rendered.starts_with("BindingContext"), "got: {rendered}");
        assert!(rendered.contains("\"text\""));
        assert!(rendered.contains("\"pick\""));
    }
}
