use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::{DecodedPage, PageValues};
use crate::read::{ColumnCursor, PageCursor};

use super::Field;

/// One projected leaf column as a stream of (def, rep, value) triples,
/// pulled page by page from a [`ColumnCursor`].
pub(crate) struct ValueStream {
    cursor: ColumnCursor,
    max_def: u32,
    max_rep: u32,
    is_utf8: bool,
    page: Option<DecodedPage>,
    level_index: usize,
    value_index: usize,
}

impl ValueStream {
    pub fn new(cursor: ColumnCursor, descriptor: &ColumnDescriptor) -> Self {
        Self {
            cursor,
            max_def: descriptor.max_def_level as u32,
            max_rep: descriptor.max_rep_level as u32,
            is_utf8: descriptor.primitive_type.is_utf8(),
            page: None,
            level_index: 0,
            value_index: 0,
        }
    }

    pub fn push_cursor(&mut self, cursor: PageCursor) {
        self.cursor.push_cursor(cursor);
    }

    fn ensure_page(&mut self) -> Result<bool> {
        loop {
            if let Some(page) = &self.page {
                if self.level_index < page.num_values {
                    return Ok(true);
                }
            }
            if !self.cursor.has_next() {
                self.page = None;
                return Ok(false);
            }
            self.page = Some(self.cursor.next_page()?);
            self.level_index = 0;
            self.value_index = 0;
        }
    }

    /// The (def, rep) levels of the next triple, without consuming it.
    pub fn peek_levels(&mut self) -> Result<Option<(u32, u32)>> {
        if !self.ensure_page()? {
            return Ok(None);
        }
        let page = self.page.as_ref().unwrap();
        let def = page.def_level(self.level_index, self.max_def);
        let rep = page.rep_level(self.level_index);
        self.check_levels(def, rep)?;
        Ok(Some((def, rep)))
    }

    /// Consumes the next triple. The value is present iff the definition
    /// level is at the column's maximum.
    pub fn next_triple(&mut self) -> Result<Option<(u32, u32, Option<Field>)>> {
        if !self.ensure_page()? {
            return Ok(None);
        }
        let page = self.page.as_ref().unwrap();
        let def = page.def_level(self.level_index, self.max_def);
        let rep = page.rep_level(self.level_index);
        self.check_levels(def, rep)?;
        self.level_index += 1;

        let value = if def == self.max_def {
            let page = self.page.as_ref().unwrap();
            let field = field_from_values(&page.values, self.value_index, self.is_utf8)?;
            self.value_index += 1;
            Some(field)
        } else {
            None
        };
        Ok(Some((def, rep, value)))
    }

    fn check_levels(&self, def: u32, rep: u32) -> Result<()> {
        if def > self.max_def {
            return Err(Error::CorruptPage(format!(
                "definition level {} exceeds the column's maximum {}",
                def, self.max_def
            )));
        }
        if rep > self.max_rep {
            return Err(Error::CorruptPage(format!(
                "repetition level {} exceeds the column's maximum {}",
                rep, self.max_rep
            )));
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.cursor.close();
        self.page = None;
    }
}

fn field_from_values(values: &PageValues, index: usize, is_utf8: bool) -> Result<Field> {
    fn get<T: Clone>(values: &[T], index: usize) -> Result<T> {
        values.get(index).cloned().ok_or_else(|| {
            Error::CorruptPage(
                "page holds fewer values than its definition levels announce".to_string(),
            )
        })
    }

    Ok(match values {
        PageValues::Boolean(v) => Field::Bool(get(v, index)?),
        PageValues::Int32(v) => Field::Int(get(v, index)?),
        PageValues::Int64(v) => Field::Long(get(v, index)?),
        PageValues::Int96(v) => Field::Int96(get(v, index)?),
        PageValues::Float(v) => Field::Float(get(v, index)?),
        PageValues::Double(v) => Field::Double(get(v, index)?),
        PageValues::ByteArray(v) => {
            let bytes = get(v, index)?;
            if is_utf8 {
                Field::Str(String::from_utf8(bytes).map_err(|_| {
                    Error::CorruptPage("string value is not valid UTF-8".to_string())
                })?)
            } else {
                Field::Bytes(bytes)
            }
        }
        PageValues::FixedLenByteArray(_, v) => Field::Bytes(get(v, index)?),
    })
}
