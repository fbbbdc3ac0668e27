use crate::{dtype::DType, element::Element, storage::Storage, NdArray};

impl<T> bincode::enc::Encode for NdArray<T>
where
    T: Element,
    T::Raw: bincode::enc::Encode,
{
    fn encode<E: bincode::enc::Encoder>(
        &self,
        encoder: &mut E,
    ) -> Result<(), bincode::error::EncodeError> {
        bincode::Encode::encode(&T::DTYPE.tag(), encoder)?;
        bincode::Encode::encode(&self.shape, encoder)?;
        bincode::Encode::encode(&self.to_raw_vec(), encoder)?;
        Ok(())
    }
}

impl<T, C> bincode::de::Decode<C> for NdArray<T>
where
    T: Element,
    T::Raw: bincode::de::Decode<C>,
{
    fn decode<D: bincode::de::Decoder<Context = C>>(
        decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        let tag: u8 = bincode::Decode::decode(decoder)?;
        let shape: Vec<usize> = bincode::Decode::decode(decoder)?;
        let data: Vec<T::Raw> = bincode::Decode::decode(decoder)?;

        let dtype = DType::from_tag(tag)
            .map_err(|e| bincode::error::DecodeError::OtherString(e.to_string()))?;
        if dtype != T::DTYPE {
            return Err(bincode::error::DecodeError::OtherString(format!(
                "expected dtype {}, got {dtype}",
                T::DTYPE
            )));
        }
        let storage = Storage::from_raw(data).map_err(|e| {
            bincode::error::DecodeError::OtherString(format!("Storage error: {e}"))
        })?;
        NdArray::from_storage(storage, &shape)
            .map_err(|e| bincode::error::DecodeError::OtherString(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bincode() -> Result<(), Box<dyn std::error::Error>> {
        let array = NdArray::<f64>::from_shape_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
        let view = array.slice(1..3, 1)?;
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&view, config)?;
        let (decoded, _): (NdArray<f64>, usize) = bincode::decode_from_slice(&bytes, config)?;
        assert_eq!(decoded.shape(), &[2, 2]);
        assert_eq!(decoded.to_vec(), vec![2.0, 3.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn test_bincode_rejects_wrong_dtype() -> Result<(), Box<dyn std::error::Error>> {
        let array = NdArray::<i32>::from_shape_vec(&[2], vec![1, 2])?;
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&array, config)?;
        assert!(bincode::decode_from_slice::<NdArray<i64>, _>(&bytes, config).is_err());
        Ok(())
    }
}
