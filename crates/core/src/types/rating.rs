//! Star rating given in a review.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a value is outside the 1–5 star range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max} stars (got {value})", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub value: i64,
}

/// A whole-star rating from 1 to 5.
///
/// ```
/// use chequealo_core::Rating;
///
/// assert_eq!(Rating::new(4).map(Rating::label), Ok("Muy bueno"));
/// assert!(Rating::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Create a rating, validating the 1–5 range.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if `value` is not between 1 and 5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError { value })
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }

    /// Spanish label shown next to the stars.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "Malo",
            2 => "Regular",
            3 => "Bueno",
            4 => "Muy bueno",
            _ => "Excelente",
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i64::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&i16::from(*self), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_one_through_five() {
        for stars in 1..=5 {
            assert_eq!(Rating::new(stars).unwrap().stars(), u8::try_from(stars).unwrap());
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(Rating::new(0), Err(RatingError { value: 0 }));
        assert_eq!(Rating::new(6), Err(RatingError { value: 6 }));
        assert_eq!(Rating::new(-3), Err(RatingError { value: -3 }));
        assert!(Rating::new(300).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Rating::new(1).unwrap().label(), "Malo");
        assert_eq!(Rating::new(3).unwrap().label(), "Bueno");
        assert_eq!(Rating::new(5).unwrap().label(), "Excelente");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Rating = serde_json::from_str("2").unwrap();
        assert_eq!(ok.stars(), 2);
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "2");
    }
}
