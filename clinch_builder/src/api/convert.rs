use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ffi::OsString;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::api::ParserSpec;

/// The error type user converters may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type ConvertFn = dyn Fn(&str, &ParserSpec) -> Result<Value, BoxError> + Send + Sync;

/// A converted, type-erased argument value.
///
/// Cloning is cheap; the underlying value is shared.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wrap `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the value as `T`, or `None` if it is some other type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// The name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}

/// The target type of an argument.
#[derive(Debug, Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    /// The value type for `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl std::hash::Hash for ValueType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Behaviour for enum-like argument types, converted by matching variant names.
///
/// ### Example
/// ```
/// # use clinch_builder as clinch;
/// use clinch::ValueEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Level {
///     Low,
///     High,
/// }
///
/// impl ValueEnum for Level {
///     fn variants() -> &'static [Self] {
///         &[Level::Low, Level::High]
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             Level::Low => "LOW",
///             Level::High => "HIGH",
///         }
///     }
/// }
/// ```
pub trait ValueEnum: Sized + Clone + Send + Sync + 'static {
    /// Every variant, in declaration order.
    fn variants() -> &'static [Self];

    /// The command line name of this variant.
    fn name(&self) -> &'static str;
}

/// The enum converter could not match a name.
#[derive(Debug, Error)]
#[error("expected one of [{}] but was '{token}'", .expected.join(", "))]
pub struct InvalidVariant {
    token: String,
    expected: Vec<&'static str>,
}

/// A conversion from a raw token into a [`Value`].
#[derive(Clone)]
pub struct Converter {
    function: Arc<ConvertFn>,
}

impl Converter {
    /// A converter from a plain function.
    pub fn new<T, E, F>(function: F) -> Self
    where
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(move |token: &str, _: &ParserSpec| {
                function(token).map(Value::new).map_err(Into::into)
            }),
        }
    }

    /// A converter based off [`FromStr`].
    pub fn parse<T>() -> Self
    where
        T: FromStr + Any + Send + Sync,
        <T as FromStr>::Err: Into<BoxError>,
    {
        Self::new(T::from_str)
    }

    /// A converter matching [`ValueEnum::name`]s, honouring the case-insensitive enum setting.
    pub fn value_enum<T: ValueEnum>() -> Self {
        Self {
            function: Arc::new(|token: &str, parser: &ParserSpec| {
                let case_insensitive = parser.is_case_insensitive_enum_values_allowed();
                T::variants()
                    .iter()
                    .find(|variant| {
                        if case_insensitive {
                            variant.name().eq_ignore_ascii_case(token)
                        } else {
                            variant.name() == token
                        }
                    })
                    .cloned()
                    .map(Value::new)
                    .ok_or_else(|| {
                        Box::new(InvalidVariant {
                            token: token.to_string(),
                            expected: T::variants().iter().map(|v| v.name()).collect(),
                        }) as BoxError
                    })
            }),
        }
    }

    pub(crate) fn apply(&self, token: &str, parser: &ParserSpec) -> Result<Value, BoxError> {
        (self.function)(token, parser)
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter{..}").finish()
    }
}

/// Conversion through a [`ConverterRegistry`] failed.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// No converter is registered for the target type.
    #[error("no converter registered for type {type_name}.")]
    Missing {
        /// The target type.
        type_name: &'static str,
    },

    /// The converter rejected the token.
    #[error("cannot convert '{token}' to {type_name}: {source}")]
    Failed {
        /// The raw token.
        token: String,
        /// The target type.
        type_name: &'static str,
        /// The converter's own error.
        #[source]
        source: BoxError,
    },
}

/// Maps target types to the [`Converter`] which produces them.
///
/// A registry belongs to one command node.
/// Subcommands receive a snapshot of it when they are registered.
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    converters: HashMap<ValueType, Converter>,
}

macro_rules! register_from_str {
    ($registry:expr, $($t:ty),+ $(,)?) => {
        $(
            $registry.insert(ValueType::of::<$t>(), Converter::parse::<$t>());
        )+
    };
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ConverterRegistry {
    /// A registry without any converters.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::default(),
        }
    }

    /// A registry holding converters for the common scalar types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        register_from_str!(
            registry,
            String,
            char,
            i8,
            i16,
            i32,
            i64,
            i128,
            isize,
            u8,
            u16,
            u32,
            u64,
            u128,
            usize,
            f32,
            f64,
            PathBuf,
            IpAddr,
            Ipv4Addr,
            Ipv6Addr,
            SocketAddr,
        );
        registry.insert(ValueType::of::<bool>(), Converter::new(parse_bool));
        registry.insert(
            ValueType::of::<OsString>(),
            Converter::new(|token: &str| Ok::<_, BoxError>(OsString::from(token))),
        );
        registry
    }

    /// Register (or replace) the converter for `T`.
    pub fn register<T, E, F>(&mut self, function: F)
    where
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        self.insert(ValueType::of::<T>(), Converter::new(function));
    }

    /// Register (or replace) the name matching converter for the enum `T`.
    pub fn register_enum<T: ValueEnum>(&mut self) {
        self.insert(ValueType::of::<T>(), Converter::value_enum::<T>());
    }

    pub(crate) fn insert(&mut self, value_type: ValueType, converter: Converter) {
        self.converters.insert(value_type, converter);
    }

    /// Layer `overrides` on top of this registry; entries in `overrides` win.
    pub(crate) fn overlay(mut self, overrides: &ConverterRegistry) -> Self {
        for (value_type, converter) in &overrides.converters {
            self.converters.insert(*value_type, converter.clone());
        }

        self
    }

    /// Whether a converter is registered for `value_type`.
    pub fn contains(&self, value_type: &ValueType) -> bool {
        self.converters.contains_key(value_type)
    }

    pub(crate) fn get(&self, value_type: &ValueType) -> Option<&Converter> {
        self.converters.get(value_type)
    }

    /// Convert `token` into the `value_type`.
    pub fn convert(
        &self,
        value_type: &ValueType,
        token: &str,
        parser: &ParserSpec,
    ) -> Result<Value, ConversionError> {
        let converter = self.get(value_type).ok_or(ConversionError::Missing {
            type_name: value_type.name(),
        })?;
        converter
            .apply(token, parser)
            .map_err(|source| ConversionError::Failed {
                token: token.to_string(),
                type_name: value_type.name(),
                source,
            })
    }
}

#[derive(Debug, Error)]
#[error("expected 'true' or 'false' but was '{0}'")]
struct InvalidBool(String);

fn parse_bool(token: &str) -> Result<bool, InvalidBool> {
    if token.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if token.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(InvalidBool(token.to_string()))
    }
}
