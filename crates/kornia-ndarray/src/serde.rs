use crate::{dtype::DType, element::Element, storage::Storage, NdArray};

use serde::ser::SerializeStruct;
use serde::Deserialize;

impl<T> serde::Serialize for NdArray<T>
where
    T: Element,
    T::Raw: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("NdArray", 3)?;
        state.serialize_field("dtype", &T::DTYPE.tag())?;
        state.serialize_field("shape", &self.shape)?;
        state.serialize_field("data", &self.to_raw_vec())?;
        state.end()
    }
}

impl<'de, T> serde::Deserialize<'de> for NdArray<T>
where
    T: Element,
    T::Raw: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct NdArrayData<R> {
            dtype: u8,
            shape: Vec<usize>,
            data: Vec<R>,
        }

        let NdArrayData { dtype, shape, data } = NdArrayData::deserialize(deserializer)?;

        let dtype = DType::from_tag(dtype).map_err(serde::de::Error::custom)?;
        if dtype != T::DTYPE {
            return Err(serde::de::Error::custom(format!(
                "expected dtype {}, got {dtype}",
                T::DTYPE
            )));
        }

        let storage = Storage::from_raw(data).map_err(serde::de::Error::custom)?;
        NdArray::from_storage(storage, &shape).map_err(serde::de::Error::custom)
    }
}
