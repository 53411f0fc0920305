use dynlink_primitives::ScalarKind;
use std::fmt;

///
/// PropertyKind
///
/// Slot shape of one property.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PropertyKind {
    Scalar,
    ToOne,
    ToManyCollection,
    ToManyMap,
}

impl PropertyKind {
    #[must_use]
    pub const fn is_to_many(self) -> bool {
        matches!(self, Self::ToManyCollection | Self::ToManyMap)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::ToOne => "to-one",
            Self::ToManyCollection => "to-many collection",
            Self::ToManyMap => "to-many map",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// ValueType
///
/// Declared value type: a scalar kind, or the name of a target record type.
/// For to-many properties this is the element (or map value) type.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ValueType {
    Scalar(ScalarKind),
    Record(String),
}

impl ValueType {
    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            Self::Record(_) => None,
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Record(name) => Some(name),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Record(name) => write!(f, "ref<{name}>"),
        }
    }
}

///
/// PropertyDescriptor
/// One named, typed slot of a record type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyDescriptor {
    name: String,
    kind: PropertyKind,
    value_type: ValueType,
    primary_key: bool,
    mapped_by: Option<String>,
}

impl PropertyDescriptor {
    fn new(name: impl Into<String>, kind: PropertyKind, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            kind,
            value_type,
            primary_key: false,
            mapped_by: None,
        }
    }

    #[must_use]
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, PropertyKind::Scalar, ValueType::Scalar(kind))
    }

    #[must_use]
    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::ToOne, ValueType::Record(target.into()))
    }

    #[must_use]
    pub fn to_many(name: impl Into<String>, element: ValueType) -> Self {
        Self::new(name, PropertyKind::ToManyCollection, element)
    }

    #[must_use]
    pub fn to_many_map(name: impl Into<String>, value: ValueType) -> Self {
        Self::new(name, PropertyKind::ToManyMap, value)
    }

    /// Flag this property as part of the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Name the to-one property on the element type that points back at the owner.
    #[must_use]
    pub fn mapped_by(mut self, back_reference: impl Into<String>) -> Self {
        self.mapped_by = Some(back_reference.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> PropertyKind {
        self.kind
    }

    #[must_use]
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub fn mapped_by_property(&self) -> Option<&str> {
        self.mapped_by.as_deref()
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self.value_type, ValueType::Record(_))
    }
}
