//! Column metadata and the ordered registry a data source keeps them in.

use crate::json::{JsObject, JsValue};

/// A single grid column.
///
/// `data` is the expression the data source uses to fetch cell values and is
/// never sent to the client; `position` only affects ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub label: String,
    pub sort_index: Option<String>,
    pub sortable: bool,
    pub position: Option<i64>,
    pub data: Option<String>,
    /// Free-form jqGrid colModel options (width, align, formatter, ...)
    pub attributes: JsObject,
}

impl Column {
    /// Create a column; the label falls back to the name and the column is
    /// only sortable when a sort index is given.
    pub fn new(
        name: impl Into<String>,
        label: Option<String>,
        sort_index: Option<String>,
        position: Option<i64>,
        data: Option<String>,
    ) -> Self {
        let name = name.into();
        Self {
            label: label.unwrap_or_else(|| name.clone()),
            sortable: sort_index.is_some(),
            name,
            sort_index,
            position,
            data,
            attributes: JsObject::new(),
        }
    }

    /// Set an attribute by its colModel key.
    ///
    /// Keys that map onto a typed field update that field; anything else is
    /// stored as-is and passed through to the client.
    pub fn set_attribute(&mut self, key: &str, value: JsValue) {
        match key {
            "label" => self.label = value_to_string(&value),
            "index" | "sidx" => {
                self.sort_index = match value {
                    JsValue::Null => None,
                    other => Some(value_to_string(&other)),
                }
            }
            "sortable" => self.sortable = !value.is_blank(),
            "position" => self.position = value.as_i64(),
            "data" => {
                self.data = match value {
                    JsValue::Null => None,
                    other => Some(value_to_string(&other)),
                }
            }
            _ => {
                self.attributes.insert(key, value);
            }
        }
    }

    /// Read an attribute by its colModel key.
    pub fn attribute(&self, key: &str) -> Option<JsValue> {
        match key {
            "name" => Some(JsValue::from(&self.name)),
            "label" => Some(JsValue::from(&self.label)),
            "index" | "sidx" => self.sort_index.as_ref().map(JsValue::from),
            "sortable" => Some(JsValue::Bool(self.sortable)),
            "position" => self.position.map(JsValue::from),
            "data" => self.data.as_ref().map(JsValue::from),
            _ => self.attributes.get(key).cloned(),
        }
    }

    /// The colModel entry sent to the client. `data` and `position` stay
    /// server-side.
    pub fn to_model(&self) -> JsObject {
        let mut model = JsObject::new()
            .with("name", &self.name)
            .with("label", &self.label);
        if let Some(index) = &self.sort_index {
            model.insert("index", index);
        }
        model.insert("sortable", self.sortable);
        model.merge(&self.attributes);
        model
    }
}

fn value_to_string(value: &JsValue) -> String {
    match value {
        JsValue::String(s) => s.clone(),
        JsValue::Null => String::new(),
        other => other.to_json(),
    }
}

/// Options accepted by `Grid::add_column`.
///
/// An integer converts into a bare position, for callers that used to pass
/// the position in place of the attribute map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOptions {
    pub position: Option<i64>,
    pub attributes: JsObject,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<JsValue>) -> Self {
        self.attributes.insert(key, value);
        self
    }
}

impl From<i64> for ColumnOptions {
    fn from(position: i64) -> Self {
        ColumnOptions::new().position(position)
    }
}

impl From<JsObject> for ColumnOptions {
    fn from(mut attributes: JsObject) -> Self {
        let position = attributes.remove("position").and_then(|p| p.as_i64());
        Self {
            position,
            attributes,
        }
    }
}

impl From<()> for ColumnOptions {
    fn from(_: ()) -> Self {
        ColumnOptions::default()
    }
}

/// Ordered, name-keyed column store.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<Column>,
    show_columns: Vec<String>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. A column with the same name is replaced in its slot.
    pub fn add(
        &mut self,
        name: &str,
        label: Option<String>,
        sort_index: Option<String>,
        position: Option<i64>,
        data: Option<String>,
    ) -> &mut Column {
        let column = Column::new(name, label, sort_index, position, data);
        let index = match self.columns.iter().position(|c| c.name == name) {
            Some(index) => {
                self.columns[index] = column;
                index
            }
            None => {
                self.columns.push(column);
                self.columns.len() - 1
            }
        };
        &mut self.columns[index]
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn show_columns(&self) -> &[String] {
        &self.show_columns
    }

    pub fn set_show_columns(&mut self, names: Vec<String>) {
        self.show_columns = names;
    }

    /// A column is visible unless a show-list exists and leaves it out.
    pub fn is_visible(&self, name: &str) -> bool {
        self.show_columns.is_empty() || self.show_columns.iter().any(|n| n == name)
    }

    /// Columns in rendering order.
    ///
    /// Columns named in the show-list come first, in show-list order. The
    /// other unpositioned columns follow in insertion order. A positioned
    /// column is then placed at its position in that order, clamped so it
    /// never lands before a show-list column. Equal positions keep insertion
    /// order.
    pub fn ordered(&self) -> Vec<&Column> {
        let show_index = |column: &Column| self.show_columns.iter().position(|n| *n == column.name);

        let mut columns: Vec<&Column> = self
            .columns
            .iter()
            .filter(|column| show_index(*column).is_some())
            .collect();
        columns.sort_by_key(|column| show_index(*column));
        let floor = columns.len();

        let mut positioned: Vec<(i64, &Column)> = Vec::new();
        for column in self.columns.iter().filter(|column| show_index(*column).is_none()) {
            match column.position {
                Some(position) => positioned.push((position, column)),
                None => columns.push(column),
            }
        }

        positioned.sort_by_key(|(position, _)| *position);
        let mut previous: Option<usize> = None;
        for (position, column) in positioned {
            let mut index = usize::try_from(position).unwrap_or(0).clamp(floor, columns.len());
            if let Some(previous) = previous {
                index = index.max(previous + 1);
            }
            columns.insert(index, column);
            previous = Some(index);
        }
        columns
    }
}
