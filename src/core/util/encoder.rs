use {crate::core::data::Data, std::collections::HashMap};

/// Bidirectional mapping between values and dense ids assigned in first-seen order.
pub struct Encoder<T: Data> {
    encoder: HashMap<T, usize>,
    decoder: Vec<T>,
}

impl<T: Data> Encoder<T> {
    pub fn new() -> Self {
        Encoder {
            encoder: HashMap::new(),
            decoder: Vec::new(),
        }
    }

    pub fn encode(&mut self, val: &T) -> usize {
        if let Some(cipher) = self.encoder.get(val) {
            return *cipher;
        }

        let cipher = self.decoder.len();
        self.decoder.push(val.clone());
        self.encoder.insert(val.clone(), cipher);
        cipher
    }

    pub fn lookup(&self, val: &T) -> Option<usize> {
        self.encoder.get(val).cloned()
    }

    pub fn decode(&self, cipher: usize) -> Option<&T> {
        self.decoder.get(cipher)
    }

    pub fn len(&self) -> usize {
        self.decoder.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_first_seen_order() {
        //setup
        let mut encoder: Encoder<String> = Encoder::new();

        //exercise
        let id = encoder.encode(&"ID".to_string());
        let int = encoder.encode(&"INT".to_string());
        let id_again = encoder.encode(&"ID".to_string());

        //verify
        assert_eq!(id, 0);
        assert_eq!(int, 1);
        assert_eq!(id_again, 0);
        assert_eq!(encoder.len(), 2);
        assert_eq!(encoder.decode(1).unwrap(), "INT");
        assert_eq!(encoder.lookup(&"SEMI".to_string()), None);
    }
}
