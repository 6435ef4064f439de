//! Typed keys for jqGrid settings.

use crate::json::JsValue;

/// A jqGrid option key. Options the builder computes itself have their own
/// variant; everything else goes through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GridSetting {
    Url,
    DataType,
    MType,
    RowNum,
    AutoWidth,
    Pager,
    Height,
    Width,
    ViewRecords,
    Caption,
    HideGrid,
    SortName,
    SortOrder,
    ColModel,
    ColNames,
    Other(String),
}

impl GridSetting {
    /// The option name as jqGrid knows it.
    pub fn key(&self) -> &str {
        match self {
            GridSetting::Url => "url",
            GridSetting::DataType => "datatype",
            GridSetting::MType => "mtype",
            GridSetting::RowNum => "rowNum",
            GridSetting::AutoWidth => "autowidth",
            GridSetting::Pager => "pager",
            GridSetting::Height => "height",
            GridSetting::Width => "width",
            GridSetting::ViewRecords => "viewrecords",
            GridSetting::Caption => "caption",
            GridSetting::HideGrid => "hidegrid",
            GridSetting::SortName => "sortname",
            GridSetting::SortOrder => "sortorder",
            GridSetting::ColModel => "colModel",
            GridSetting::ColNames => "colNames",
            GridSetting::Other(key) => key,
        }
    }
}

impl From<&str> for GridSetting {
    fn from(key: &str) -> Self {
        match key {
            "url" => GridSetting::Url,
            "datatype" => GridSetting::DataType,
            "mtype" => GridSetting::MType,
            "rowNum" => GridSetting::RowNum,
            "autowidth" => GridSetting::AutoWidth,
            "pager" => GridSetting::Pager,
            "height" => GridSetting::Height,
            "width" => GridSetting::Width,
            "viewrecords" => GridSetting::ViewRecords,
            "caption" => GridSetting::Caption,
            "hidegrid" => GridSetting::HideGrid,
            "sortname" => GridSetting::SortName,
            "sortorder" => GridSetting::SortOrder,
            "colModel" => GridSetting::ColModel,
            "colNames" => GridSetting::ColNames,
            other => GridSetting::Other(other.to_string()),
        }
    }
}

impl From<String> for GridSetting {
    fn from(key: String) -> Self {
        GridSetting::from(key.as_str())
    }
}

/// Caller-supplied settings, merged over the computed ones at render time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridAttributes {
    entries: Vec<(GridSetting, JsValue)>,
}

impl GridAttributes {
    pub fn set(&mut self, setting: GridSetting, value: JsValue) {
        match self.entries.iter_mut().find(|(s, _)| *s == setting) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((setting, value)),
        }
    }

    pub fn get(&self, setting: &GridSetting) -> Option<&JsValue> {
        self.entries.iter().find(|(s, _)| s == setting).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GridSetting, &JsValue)> {
        self.entries.iter().map(|(s, v)| (s, v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_round_trip() {
        for key in ["url", "rowNum", "autowidth", "width", "colNames", "sortorder"] {
            assert_eq!(GridSetting::from(key).key(), key);
        }
    }

    #[test]
    fn test_unknown_key_is_other() {
        let setting = GridSetting::from("multiselect");
        assert_eq!(setting, GridSetting::Other("multiselect".to_string()));
        assert_eq!(setting.key(), "multiselect");
    }

    #[test]
    fn test_attributes_replace_in_place() {
        let mut attributes = GridAttributes::default();
        attributes.set(GridSetting::HideGrid, JsValue::from(false));
        attributes.set(GridSetting::AutoWidth, JsValue::from(true));
        attributes.set(GridSetting::HideGrid, JsValue::from(true));

        let keys: Vec<&str> = attributes.iter().map(|(s, _)| s.key()).collect();
        assert_eq!(keys, vec!["hidegrid", "autowidth"]);
        assert_eq!(attributes.get(&GridSetting::HideGrid), Some(&JsValue::from(true)));
    }
}
