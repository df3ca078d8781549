use crate::frame::Frame;
use crate::Result;

impl Frame {
    /// Drop rows holding NA (null, or a NaN float) in the selected columns.
    ///
    /// `None` selects every column. With `where_all_na` a row is dropped only
    /// when all selected cells are NA, otherwise when any of them is. An
    /// explicit empty selection keeps every row.
    pub fn drop_na(&self, columns: Option<&[&str]>, where_all_na: bool) -> Result<Frame> {
        let indices = match columns {
            Some([]) => return Ok(self.clone()),
            Some(names) => self.column_indices(names)?,
            None => (0..self.width()).collect(),
        };
        if indices.is_empty() {
            return Ok(self.clone());
        }

        let selected: Vec<_> = indices
            .iter()
            .filter_map(|&i| self.column_at(i))
            .collect();
        self.drop(|row| {
            let mut na = selected
                .iter()
                .map(|c| c.get(row.index()).map_or(true, |v| v.is_na()));
            Ok(if where_all_na {
                na.all(|is_na| is_na)
            } else {
                na.any(|is_na| is_na)
            })
        })
    }
}
