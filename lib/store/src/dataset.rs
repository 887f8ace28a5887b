use crate::reader::RawSnapshot;
use ahash::AHashMap;
use credrisk_core::{Error, Result};

/// Unique-identifier column of the upstream extract.
pub const ID_COLUMN: &str = "SK_ID_CURR";

/// Label column: 0 = loan repaid, 1 = defaulted.
pub const TARGET_COLUMN: &str = "TARGET";

/// The loaded client snapshot: raw (pre-imputation) cells with id and
/// column lookups. Immutable after load.
#[derive(Debug)]
pub struct ClientDataset {
    columns: Vec<String>,
    col_index: AHashMap<String, usize>,
    ids: Vec<u64>,
    id_to_row: AHashMap<u64, usize>,
    records: Vec<Vec<Option<f64>>>,
}

impl ClientDataset {
    pub fn from_snapshot(snapshot: RawSnapshot) -> Result<Self> {
        let RawSnapshot { columns, records } = snapshot;

        let col_index: AHashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        let id_col = *col_index
            .get(ID_COLUMN)
            .ok_or_else(|| Error::Dataset(format!("snapshot lacks {ID_COLUMN} column")))?;

        let mut ids = Vec::with_capacity(records.len());
        let mut id_to_row = AHashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            let id = record[id_col]
                .filter(|v| v.fract() == 0.0 && *v >= 0.0)
                .map(|v| v as u64)
                .ok_or_else(|| Error::Dataset(format!("row {}: bad client id", row + 1)))?;
            if id_to_row.insert(id, row).is_some() {
                return Err(Error::DuplicateClient(id));
            }
            ids.push(id);
        }

        Ok(Self {
            columns,
            col_index,
            ids,
            id_to_row,
            records,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Client ids in snapshot order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    #[must_use]
    pub fn contains(&self, client_id: u64) -> bool {
        self.id_to_row.contains_key(&client_id)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.col_index.contains_key(name)
    }

    /// All column names starting with `prefix`, in snapshot order.
    /// Used to walk one-hot encoded groups.
    pub fn columns_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.columns
            .iter()
            .filter(move |c| c.starts_with(prefix))
            .map(String::as_str)
    }

    /// Raw cell for one client. Unknown id is a client error, unknown
    /// column a snapshot-shape error.
    pub fn value(&self, client_id: u64, column: &str) -> Result<Option<f64>> {
        let row = self.row_of(client_id)?;
        let col = *self
            .col_index
            .get(column)
            .ok_or_else(|| Error::Dataset(format!("unknown column {column}")))?;
        Ok(self.records[row][col])
    }

    /// Raw cell defaulted to 0.0 when missing, mirroring the upstream
    /// fill-with-zero policy for display values.
    pub fn value_or_zero(&self, client_id: u64, column: &str) -> Result<f64> {
        Ok(self.value(client_id, column)?.unwrap_or(0.0))
    }

    /// Whether the client's loan was repaid (TARGET == 0).
    pub fn repaid(&self, client_id: u64) -> Result<bool> {
        Ok(self.value_or_zero(client_id, TARGET_COLUMN)? == 0.0)
    }

    /// Feature column names: everything except the id and the label.
    #[must_use]
    pub fn feature_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.as_str() != ID_COLUMN && c.as_str() != TARGET_COLUMN)
            .cloned()
            .collect()
    }

    /// Raw feature rows in snapshot order, aligned with
    /// [`feature_columns`](Self::feature_columns). Input to the preprocessor.
    #[must_use]
    pub fn feature_rows(&self) -> Vec<Vec<Option<f64>>> {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() != ID_COLUMN && c.as_str() != TARGET_COLUMN)
            .map(|(i, _)| i)
            .collect();

        self.records
            .iter()
            .map(|record| keep.iter().map(|&i| record[i]).collect())
            .collect()
    }

    /// One client's raw feature row, aligned with
    /// [`feature_columns`](Self::feature_columns).
    pub fn feature_row(&self, client_id: u64) -> Result<Vec<Option<f64>>> {
        let row = self.row_of(client_id)?;
        let record = &self.records[row];
        Ok(self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() != ID_COLUMN && c.as_str() != TARGET_COLUMN)
            .map(|(i, _)| record[i])
            .collect())
    }

    fn row_of(&self, client_id: u64) -> Result<usize> {
        self.id_to_row
            .get(&client_id)
            .copied()
            .ok_or(Error::ClientNotFound(client_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample() -> ClientDataset {
        let snapshot = RawSnapshot {
            columns: vec![
                "SK_ID_CURR".to_string(),
                "TARGET".to_string(),
                "AMT_INCOME_TOTAL".to_string(),
                "NAME_INCOME_TYPE_Working".to_string(),
                "NAME_INCOME_TYPE_Pensioner".to_string(),
            ],
            records: vec![
                vec![Some(100001.0), Some(0.0), Some(202500.0), Some(1.0), Some(0.0)],
                vec![Some(100002.0), Some(1.0), None, Some(0.0), Some(1.0)],
            ],
        };
        ClientDataset::from_snapshot(snapshot).unwrap()
    }

    #[test]
    fn test_id_lookup() {
        let dataset = sample();
        assert_eq!(dataset.ids(), &[100001, 100002]);
        assert!(dataset.contains(100002));
        assert!(!dataset.contains(42));
    }

    #[test]
    fn test_value_access() {
        let dataset = sample();
        assert_eq!(
            dataset.value(100001, "AMT_INCOME_TOTAL").unwrap(),
            Some(202500.0)
        );
        assert_eq!(dataset.value(100002, "AMT_INCOME_TOTAL").unwrap(), None);
        assert_eq!(dataset.value_or_zero(100002, "AMT_INCOME_TOTAL").unwrap(), 0.0);

        let err = dataset.value(9, "AMT_INCOME_TOTAL").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_repaid() {
        let dataset = sample();
        assert!(dataset.repaid(100001).unwrap());
        assert!(!dataset.repaid(100002).unwrap());
    }

    #[test]
    fn test_feature_extraction_drops_id_and_label() {
        let dataset = sample();
        let cols = dataset.feature_columns();
        assert_eq!(
            cols,
            vec![
                "AMT_INCOME_TOTAL",
                "NAME_INCOME_TYPE_Working",
                "NAME_INCOME_TYPE_Pensioner"
            ]
        );
        let rows = dataset.feature_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![Some(202500.0), Some(1.0), Some(0.0)]);
        assert_eq!(dataset.feature_row(100002).unwrap(), rows[1]);
    }

    #[test]
    fn test_missing_id_column_is_fatal() {
        let snapshot = RawSnapshot {
            columns: vec!["TARGET".to_string()],
            records: vec![vec![Some(0.0)]],
        };
        let err = ClientDataset::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let snapshot = RawSnapshot {
            columns: vec!["SK_ID_CURR".to_string()],
            records: vec![vec![Some(7.0)], vec![Some(7.0)]],
        };
        let err = ClientDataset::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, Error::DuplicateClient(7)));
    }
}
