use crate::NdArrayError;

/// The closed set of element kinds an array can hold.
///
/// Each kind carries a stable numeric tag used for serialization and dispatch.
/// Complex kinds are stored as interleaved `(re, im)` lane pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Complex number made of two `f32` lanes.
    Complex32,
    /// Complex number made of two `f64` lanes.
    Complex64,
}

impl DType {
    /// All element kinds ordered by tag.
    pub const ALL: [DType; 8] = [
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Float32,
        DType::Float64,
        DType::Complex32,
        DType::Complex64,
    ];

    /// Returns the stable numeric tag of the element kind.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Int8 => 0,
            Self::Int16 => 1,
            Self::Int32 => 2,
            Self::Int64 => 3,
            Self::Float32 => 4,
            Self::Float64 => 5,
            Self::Complex32 => 6,
            Self::Complex64 => 7,
        }
    }

    /// Returns the element kind for a numeric tag.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::InvalidArgument`] for unknown tags.
    pub fn from_tag(tag: u8) -> Result<Self, NdArrayError> {
        Self::ALL
            .get(tag as usize)
            .copied()
            .ok_or_else(|| NdArrayError::invalid_argument(format!("unknown dtype tag {tag}")))
    }

    /// Returns the size in bytes of one logical element.
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float32 => 4,
            Self::Int64 | Self::Float64 | Self::Complex32 => 8,
            Self::Complex64 => 16,
        }
    }

    /// Returns true for integer and floating point kinds.
    #[must_use]
    pub const fn is_real(self) -> bool {
        !self.is_complex()
    }

    /// Returns true for the two complex kinds.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex32 | Self::Complex64)
    }

    /// Returns true for the signed integer kinds.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns true for the real floating point kinds.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex32 => "complex32",
            Self::Complex64 => "complex64",
        };
        f.write_str(name)
    }
}
