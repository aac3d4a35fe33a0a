//! Query-string construction following the API's bare-key convention for falsy values.
//!
//! Truthy values render as `key=value&`; falsy values (`false`, `0`, empty string, null)
//! render as the bare key followed by `&`. Nothing is percent-encoded, so callers pass
//! values exactly as the API expects to see them (`page[size]`, `range[id]=1,10001`, ...).

// self
use crate::_prelude::*;

/// Scalar value carried by a query parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// Absent value; always rendered as a bare key.
	Null,
	/// Boolean flag.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Floating-point number.
	Float(f64),
	/// Verbatim string.
	Str(String),
}
impl ParamValue {
	/// Returns `false` for `false`, `0`, `0.0`, `NaN`, the empty string, and null.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(value) => *value,
			Self::Int(value) => *value != 0,
			Self::Float(value) => *value != 0. && !value.is_nan(),
			Self::Str(value) => !value.is_empty(),
		}
	}
}
impl Display for ParamValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Null => Ok(()),
			Self::Bool(value) => write!(f, "{value}"),
			Self::Int(value) => write!(f, "{value}"),
			Self::Float(value) => write!(f, "{value}"),
			Self::Str(value) => f.write_str(value),
		}
	}
}
impl From<bool> for ParamValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}
impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}
impl From<f64> for ParamValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}
impl<T> From<Option<T>> for ParamValue
where
	T: Into<ParamValue>,
{
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}
macro_rules! impl_from_int {
	($($ty:ty),+) => {
		$(
			impl From<$ty> for ParamValue {
				fn from(value: $ty) -> Self {
					Self::Int(i64::from(value))
				}
			}
		)+
	};
}
impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// Ordered parameter list; insertion order is preserved in the rendered query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams(Vec<(String, ParamValue)>);
impl QueryParams {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a parameter, keeping duplicates in order.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.push(key, value);

		self
	}

	/// Appends a parameter in place.
	pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
		self.0.push((key.into(), value.into()));
	}

	/// Iterates over the parameters in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Returns the first value recorded for `key`.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, value)| value)
	}

	/// Returns the number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` if no parameter was recorded.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for QueryParams
where
	K: Into<String>,
	V: Into<ParamValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// Renders `params` as `key=value&` / `key&` segments, trailing `&` included.
pub fn build_query(params: &QueryParams) -> String {
	let mut buf = String::new();

	for (key, value) in params.iter() {
		buf.push_str(key);

		if value.is_truthy() {
			buf.push('=');
			buf.push_str(&value.to_string());
		}

		buf.push('&');
	}

	buf
}

/// Appends `?` plus the rendered query to `path`; absent params leave the path untouched.
pub fn append_query(path: &str, params: Option<&QueryParams>) -> String {
	match params {
		Some(params) => format!("{path}?{}", build_query(params)),
		None => path.to_owned(),
	}
}
