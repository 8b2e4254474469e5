use std::collections::HashMap;

/// Term → 1-based positions in a token stream, in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionTable {
    order: Vec<String>,
    positions: HashMap<String, Vec<u32>>,
}

impl PositionTable {
    /// Builds the table for a stemmed token stream
    pub fn from_terms<S: AsRef<str>>(terms: &[S]) -> Self {
        let mut table = Self::default();
        for (idx, term) in terms.iter().enumerate() {
            let term = term.as_ref();
            let position = idx as u32 + 1;
            match table.positions.get_mut(term) {
                Some(list) => list.push(position),
                None => {
                    table.order.push(term.to_string());
                    table.positions.insert(term.to_string(), vec![position]);
                }
            }
        }
        table
    }

    /// Distinct terms in first-occurrence order
    pub fn terms(&self) -> &[String] {
        &self.order
    }

    pub fn positions(&self, term: &str) -> Option<&[u32]> {
        self.positions.get(term).map(Vec::as_slice)
    }

    /// Iterates `(term, positions)` in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.order
            .iter()
            .map(move |t| (t.as_str(), self.positions[t].as_slice()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
