use serde::{Deserialize, Deserializer};

/// Three-state field for partial updates.
///
/// With `#[serde(default)]` on the containing field a missing key is
/// `Unchanged` and an explicit `null` is `SetToNull`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

impl<T> From<Option<T>> for OptionField<T> {
    /// A present value sets the field, `None` clears it.
    fn from(value: Option<T>) -> Self {
        value.map_or(OptionField::SetToNull, OptionField::SetToValue)
    }
}

impl<T> OptionField<T> {
    /// `None` when unchanged, otherwise the value to store.
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Self::Unchanged => None,
            Self::SetToNull => Some(None),
            Self::SetToValue(v) => Some(Some(v)),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

impl<T: Clone> OptionField<T> {
    /// Writes the change into `target`; `Unchanged` leaves it alone.
    pub fn apply(&self, target: &mut Option<T>) {
        match self {
            Self::Unchanged => {}
            Self::SetToNull => *target = None,
            Self::SetToValue(v) => *target = Some(v.clone()),
        }
    }
}

impl OptionField<String> {
    pub fn flatten_str(&self) -> Option<&str> {
        match self {
            Self::SetToValue(v) => Some(v.as_str()),
            _ => None,
        }
    }
}
