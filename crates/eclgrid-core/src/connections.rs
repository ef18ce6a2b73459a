//! Compressed sparse row assembly of cell-to-cell connections.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectionError {
    #[error("weighted and unweighted connections can not be mixed")]
    MixedWeights,
    #[error("vertex {vertex} is out of range for {num_rows} rows")]
    VertexOutOfRange { vertex: usize, num_rows: usize },
    #[error("connections have not been compressed")]
    NotCompressed,
    #[error("row {row} is out of range for {num_rows} rows")]
    RowOutOfRange { row: usize, num_rows: usize },
}

/// Directed edges collected in any order and compressed into CSR form.
///
/// Duplicate edges are merged on [`compress`](Self::compress): weights of
/// weighted duplicates are summed, unweighted duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledConnections {
    edges: Vec<(usize, usize)>,
    edge_weights: Option<Vec<f64>>,
    start_pointers: Vec<usize>,
    neighbourhood: Vec<usize>,
    weights: Vec<f64>,
    compressed: bool,
}

impl AssembledConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_connection(&mut self, source: usize, target: usize) -> Result<(), ConnectionError> {
        if self.edge_weights.is_some() {
            return Err(ConnectionError::MixedWeights);
        }
        self.edges.push((source, target));
        self.compressed = false;
        Ok(())
    }

    pub fn add_weighted_connection(
        &mut self,
        source: usize,
        target: usize,
        weight: f64,
    ) -> Result<(), ConnectionError> {
        if self.edge_weights.is_none() && !self.edges.is_empty() {
            return Err(ConnectionError::MixedWeights);
        }
        self.edge_weights.get_or_insert_with(Vec::new).push(weight);
        self.edges.push((source, target));
        self.compressed = false;
        Ok(())
    }

    pub fn is_weighted(&self) -> bool {
        self.edge_weights.is_some()
    }

    /// Builds the CSR arrays for `num_rows` vertices from every edge added
    /// so far.
    pub fn compress(&mut self, num_rows: usize) -> Result<(), ConnectionError> {
        if let Some(&(source, target)) = self
            .edges
            .iter()
            .find(|(source, target)| *source >= num_rows || *target >= num_rows)
        {
            return Err(ConnectionError::VertexOutOfRange {
                vertex: source.max(target),
                num_rows,
            });
        }

        let mut order: Vec<usize> = (0..self.edges.len()).collect();
        order.sort_by_key(|&edge| self.edges[edge]);

        let mut start_pointers = vec![0; num_rows + 1];
        let mut neighbourhood = Vec::with_capacity(self.edges.len());
        let mut weights = Vec::new();
        let mut previous = None;
        for edge in order {
            let (source, target) = self.edges[edge];
            let weight = self.edge_weights.as_ref().map(|weights| weights[edge]);
            if previous == Some((source, target)) {
                if let (Some(last), Some(weight)) = (weights.last_mut(), weight) {
                    *last += weight;
                }
                continue;
            }
            previous = Some((source, target));
            start_pointers[source + 1] += 1;
            neighbourhood.push(target);
            if let Some(weight) = weight {
                weights.push(weight);
            }
        }
        for row in 0..num_rows {
            start_pointers[row + 1] += start_pointers[row];
        }

        self.start_pointers = start_pointers;
        self.neighbourhood = neighbourhood;
        self.weights = weights;
        self.compressed = true;
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.start_pointers.len().saturating_sub(1)
    }

    pub fn num_connections(&self) -> usize {
        self.neighbourhood.len()
    }

    pub fn start_pointers(&self) -> &[usize] {
        &self.start_pointers
    }

    pub fn neighbourhood(&self) -> &[usize] {
        &self.neighbourhood
    }

    /// Merged weights parallel to [`neighbourhood`](Self::neighbourhood);
    /// empty for unweighted connections.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn row_range(&self, row: usize) -> Result<std::ops::Range<usize>, ConnectionError> {
        if !self.compressed {
            return Err(ConnectionError::NotCompressed);
        }
        if row >= self.num_rows() {
            return Err(ConnectionError::RowOutOfRange {
                row,
                num_rows: self.num_rows(),
            });
        }
        Ok(self.start_pointers[row]..self.start_pointers[row + 1])
    }

    /// Targets of `row`, sorted ascending.
    pub fn neighbours(&self, row: usize) -> Result<&[usize], ConnectionError> {
        let range = self.row_range(row)?;
        Ok(&self.neighbourhood[range])
    }

    pub fn row_weights(&self, row: usize) -> Result<&[f64], ConnectionError> {
        let range = self.row_range(row)?;
        Ok(self.weights.get(range).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::{AssembledConnections, ConnectionError};

    #[test]
    fn edges_compress_into_sorted_rows() {
        let mut connections = AssembledConnections::new();
        for (source, target) in [(2, 3), (0, 2), (1, 3), (0, 1)] {
            connections
                .add_connection(source, target)
                .expect("unweighted edges");
        }
        connections.compress(4).expect("vertices in range");

        assert_eq!(connections.start_pointers(), &[0, 2, 3, 4, 4]);
        assert_eq!(connections.neighbourhood(), &[1, 2, 3, 3]);
        assert_eq!(connections.num_rows(), 4);
        assert_eq!(connections.num_connections(), 4);
        assert_eq!(connections.neighbours(0).expect("row 0"), &[1, 2]);
        assert!(connections.neighbours(3).expect("row 3").is_empty());
        assert!(connections.weights().is_empty());
    }

    #[test]
    fn duplicates_merge_and_weights_sum() {
        let mut connections = AssembledConnections::new();
        connections.add_weighted_connection(1, 0, 0.5).expect("weighted");
        connections.add_weighted_connection(0, 1, 1.0).expect("weighted");
        connections.add_weighted_connection(1, 0, 2.0).expect("weighted");
        connections.compress(2).expect("vertices in range");

        assert_eq!(connections.start_pointers(), &[0, 1, 2]);
        assert_eq!(connections.weights(), &[1.0, 2.5]);
        assert_eq!(connections.row_weights(1).expect("row 1"), &[2.5]);

        let mut unweighted = AssembledConnections::new();
        unweighted.add_connection(0, 1).expect("unweighted");
        unweighted.add_connection(0, 1).expect("unweighted");
        unweighted.compress(2).expect("vertices in range");
        assert_eq!(unweighted.neighbourhood(), &[1]);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut connections = AssembledConnections::new();
        connections.add_connection(0, 1).expect("unweighted");
        assert_eq!(
            connections.add_weighted_connection(1, 0, 1.0),
            Err(ConnectionError::MixedWeights)
        );
        assert_eq!(
            connections.neighbours(0),
            Err(ConnectionError::NotCompressed)
        );
        connections.add_connection(0, 5).expect("unweighted");
        assert_eq!(
            connections.compress(3),
            Err(ConnectionError::VertexOutOfRange { vertex: 5, num_rows: 3 })
        );
        connections.compress(6).expect("vertices in range");
        assert!(matches!(
            connections.neighbours(6),
            Err(ConnectionError::RowOutOfRange { row: 6, .. })
        ));
    }
}
