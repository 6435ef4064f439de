//! The jqGrid builder.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use super::column::{ColumnOptions, ColumnRegistry};
use super::data_source::{ArrayDataSource, DataSource};
use super::settings::{GridAttributes, GridSetting};
use super::{DEFAULT_HEIGHT, DEFAULT_ROWS_PER_PAGE, UNLIMITED_ROWS};
use crate::error::PikeError;
use crate::json::{self, JsObject, JsValue};

static NEXT_GRID_ID: AtomicU32 = AtomicU32::new(1);

const ROW_CLICK_TEMPLATE: &str = r#"$('#{id}').jqGrid('setGridParam', {
    'onCellSelect' : function(rowId, iCol, cellContent, e) {
        // Only fire when the cell itself was clicked, not an element inside it
        if ('gridcell' == $(e.target).attr('role')) {
            {script}
        }
    }
}).trigger('reloadGrid');"#;

const CURSOR_FIX_TEMPLATE: &str = r##"if ($("#{id}").length) {
    var cm = $("#{id}")[0].p.colModel;
    $.each($("#{id}")[0].grid.headers, function(index, value) {
        var cmi = cm[index], colName = cmi.name;
        if (!cmi.sortable && colName !== 'rn' && colName !== 'cb' && colName !== 'subgrid') {
            $('div.ui-jqgrid-sortable', value.el).css({ cursor: "default" });
        }
    });
}"##;

/// A jqGrid method call replayed after the grid is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMethod {
    pub name: String,
    pub options: JsValue,
}

/// Builds the HTML scaffold and JavaScript declaration for one jqGrid.
///
/// Rows are fetched by the grid itself with a POST to `url`; the builder
/// only describes columns and display settings.
pub struct Grid<D = ArrayDataSource> {
    id: String,
    classes: Option<String>,
    pager_id: String,
    data_source: Option<D>,
    rows_per_page: u32,
    height: String,
    url: String,
    attributes: GridAttributes,
    methods: Vec<GridMethod>,
    row_click_event: Option<String>,
}

impl<D: DataSource> Grid<D> {
    /// A grid with a generated id, posting to `/` until `set_url` is called.
    pub fn new() -> Self {
        let id = format!("pgrid{}", NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed));
        let mut grid = Self {
            pager_id: pager_id_for(&id),
            id,
            classes: None,
            data_source: None,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            height: DEFAULT_HEIGHT.to_string(),
            url: "/".to_string(),
            attributes: GridAttributes::default(),
            methods: Vec::new(),
            row_click_event: None,
        };
        grid.set_defaults();
        grid
    }

    pub fn with_data_source(data_source: D) -> Self {
        let mut grid = Self::new();
        grid.set_data_source(data_source);
        grid
    }

    pub fn set_data_source(&mut self, data_source: D) -> &mut Self {
        self.data_source = Some(data_source);
        self
    }

    pub fn data_source(&self) -> Option<&D> {
        self.data_source.as_ref()
    }

    pub fn data_source_mut(&mut self) -> Option<&mut D> {
        self.data_source.as_mut()
    }

    fn columns(&self) -> Result<&ColumnRegistry, PikeError> {
        self.data_source
            .as_ref()
            .map(DataSource::columns)
            .ok_or(PikeError::MissingDataSource)
    }

    fn columns_mut(&mut self) -> Result<&mut ColumnRegistry, PikeError> {
        self.data_source
            .as_mut()
            .map(DataSource::columns_mut)
            .ok_or(PikeError::MissingDataSource)
    }

    /// Default attributes every grid starts with.
    pub fn set_defaults(&mut self) -> &mut Self {
        self.set_attribute("hidegrid", false)
            .set_attribute("autowidth", true)
    }

    /// Set the DOM id; the pager id follows it.
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self.pager_id = pager_id_for(&self.id);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_pager_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.pager_id = id.into();
        self
    }

    pub fn pager_id(&self) -> &str {
        &self.pager_id
    }

    /// Whitespace separated CSS classes for the table element.
    pub fn set_classes(&mut self, classes: impl Into<String>) -> &mut Self {
        self.classes = Some(classes.into());
        self
    }

    pub fn classes(&self) -> Option<&str> {
        self.classes.as_deref()
    }

    pub fn attribute(&self, setting: impl Into<GridSetting>) -> Option<&JsValue> {
        self.attributes.get(&setting.into())
    }

    /// Set a jqGrid option. These win over everything the builder computes.
    pub fn set_attribute(
        &mut self,
        setting: impl Into<GridSetting>,
        value: impl Into<JsValue>,
    ) -> &mut Self {
        self.attributes.set(setting.into(), value.into());
        self
    }

    #[deprecated(note = "use set_attribute(\"caption\", ..)")]
    pub fn set_caption(&mut self, caption: impl Into<String>) -> &mut Self {
        self.set_attribute(GridSetting::Caption, caption.into())
    }

    /// Rows per page; `-1` means all rows.
    pub fn set_rows_per_page(&mut self, amount: i64) -> Result<&mut Self, PikeError> {
        let amount = if amount == -1 {
            UNLIMITED_ROWS
        } else {
            u32::try_from(amount.max(0)).unwrap_or(UNLIMITED_ROWS)
        };

        let data_source = self
            .data_source
            .as_mut()
            .ok_or(PikeError::MissingDataSource)?;
        data_source.set_results_per_page(amount);
        self.rows_per_page = amount;

        Ok(self)
    }

    pub fn rows_per_page(&self) -> u32 {
        self.rows_per_page
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add a column, or update it when the data source already has one by
    /// this name.
    ///
    /// Without a sort index the column is never sortable, whatever the
    /// options say.
    pub fn add_column(
        &mut self,
        name: &str,
        data: impl Into<String>,
        label: Option<&str>,
        sort_index: Option<&str>,
        options: impl Into<ColumnOptions>,
    ) -> Result<&mut Self, PikeError> {
        let ColumnOptions {
            mut position,
            attributes,
        } = options.into();
        let data = data.into();
        let columns = self.columns_mut()?;

        if position.is_none() {
            position = columns
                .show_columns()
                .iter()
                .position(|n| n == name)
                .map(|index| index as i64);
        }

        if let Some(column) = columns.get_mut(name) {
            column.data = Some(data);
            column.label = label.unwrap_or(name).to_string();
            column.sort_index = sort_index.map(str::to_string);
            if position.is_some() {
                column.position = position;
            }
        } else {
            columns.add(
                name,
                label.map(str::to_string),
                sort_index.map(str::to_string),
                position,
                Some(data),
            );
        }

        let column = columns
            .get_mut(name)
            .ok_or_else(|| PikeError::UnknownColumn(name.to_string()))?;

        for (key, value) in attributes {
            column.set_attribute(&key, value);
        }
        column.sortable = sort_index.is_some() && column.sortable;

        debug!(column = name, "Added grid column");
        Ok(self)
    }

    pub fn set_column_attribute(
        &mut self,
        name: &str,
        key: &str,
        value: impl Into<JsValue>,
    ) -> Result<&mut Self, PikeError> {
        let column = self
            .columns_mut()?
            .get_mut(name)
            .ok_or_else(|| PikeError::UnknownColumn(name.to_string()))?;
        column.set_attribute(key, value.into());
        Ok(self)
    }

    pub fn set_column_attributes(
        &mut self,
        name: &str,
        attributes: JsObject,
    ) -> Result<&mut Self, PikeError> {
        for (key, value) in attributes {
            self.set_column_attribute(name, &key, value)?;
        }
        Ok(self)
    }

    /// Show only these columns, in this order. The rest stay in the grid
    /// as hidden columns.
    pub fn show_columns<I, S>(&mut self, names: I) -> Result<&mut Self, PikeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect();
        self.columns_mut()?.set_show_columns(names);
        Ok(self)
    }

    /// Queue a jqGrid method call for after construction. Calling it again
    /// with the same name replaces the options but keeps the original slot.
    pub fn set_method(&mut self, name: impl Into<String>, options: impl Into<JsValue>) -> &mut Self {
        let name = name.into();
        let options = options.into();
        match self.methods.iter_mut().find(|m| m.name == name) {
            Some(method) => method.options = options,
            None => self.methods.push(GridMethod { name, options }),
        }
        self
    }

    pub fn methods(&self) -> &[GridMethod] {
        &self.methods
    }

    /// JavaScript run when a cell is clicked. `rowId` holds the row id
    /// (the data source's identifier column, or the row number).
    pub fn set_row_click_event(&mut self, script: impl Into<String>) -> &mut Self {
        self.row_click_event = Some(script.into());
        self
    }

    /// The table and pager elements the grid attaches to.
    pub fn html(&self) -> String {
        format!(
            r#"<table id="{}" class="{}"></table><div id="{}"></div>"#,
            escape_attribute(&self.id),
            escape_attribute(self.classes.as_deref().unwrap_or_default()),
            escape_attribute(&self.pager_id),
        )
    }

    /// The settings object passed to the jqGrid constructor.
    pub fn settings(&self) -> Result<JsObject, PikeError> {
        let data_source = self
            .data_source
            .as_ref()
            .ok_or(PikeError::MissingDataSource)?;
        let columns = self.columns()?;

        let mut settings = JsObject::new()
            .with(GridSetting::Url.key(), &self.url)
            .with(GridSetting::DataType.key(), "json")
            .with(GridSetting::MType.key(), "post")
            .with(GridSetting::RowNum.key(), self.rows_per_page)
            .with(GridSetting::AutoWidth.key(), true)
            .with(GridSetting::Pager.key(), &self.pager_id)
            .with(GridSetting::Height.key(), &self.height)
            .with(GridSetting::ViewRecords.key(), true);

        let mut col_model = Vec::with_capacity(columns.len());
        let mut col_names = Vec::with_capacity(columns.len());
        for column in columns.ordered() {
            let mut model = column.to_model();
            if !columns.is_visible(&column.name) {
                model.insert("hidden", true);
            }
            col_names.push(JsValue::from(&column.label));
            col_model.push(JsValue::from(model));
        }
        settings.insert(GridSetting::ColModel.key(), JsValue::Array(col_model));
        settings.insert(GridSetting::ColNames.key(), JsValue::Array(col_names));

        if let Some(sorting) = data_source.default_sorting() {
            settings.insert(GridSetting::SortName.key(), sorting.index);
            settings.insert(GridSetting::SortOrder.key(), sorting.direction.as_str());
        }

        for (setting, value) in self.attributes.iter() {
            settings.insert(setting.key(), value.clone());
        }

        // jqGrid ignores an explicit width while autowidth is on
        let has_width = settings
            .get(GridSetting::Width.key())
            .is_some_and(|width| !width.is_blank());
        if has_width {
            settings.insert(GridSetting::AutoWidth.key(), false);
        }

        Ok(settings)
    }

    /// The full jqGrid declaration: constructor, row click binding, queued
    /// method calls and the header cursor fix.
    pub fn javascript(&self, pretty: bool) -> Result<String, PikeError> {
        let settings = JsValue::from(self.settings()?);
        let mut output = String::from("var lastsel;\n");
        output.push_str(&format!(
            "$(\"#{}\").jqGrid({});\n",
            self.id,
            json::encode(&settings, pretty)
        ));

        if let Some(script) = &self.row_click_event {
            output.push('\n');
            output.push_str(&fill_template(
                ROW_CLICK_TEMPLATE,
                &[("{id}", self.id.as_str()), ("{script}", script.as_str())],
            ));
            output.push('\n');
        }

        output.push('\n');
        output.push_str(&self.render_methods());
        output.push('\n');
        output.push_str(&fill_template(CURSOR_FIX_TEMPLATE, &[("{id}", self.id.as_str())]));
        output.push('\n');

        debug!(grid = %self.id, methods = self.methods.len(), "Rendered grid javascript");
        Ok(output)
    }

    fn render_methods(&self) -> String {
        self.methods
            .iter()
            .map(|method| {
                format!(
                    "$(\"#{}\").jqGrid(\"{}\", {});\n",
                    self.id,
                    method.name,
                    method.options.to_json_pretty()
                )
            })
            .collect()
    }
}

impl<D: DataSource> Default for Grid<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DataSource> fmt::Display for Grid<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html())
    }
}

fn pager_id_for(id: &str) -> String {
    format!("{id}-pager")
}

/// Substitute placeholders in one left-to-right pass, so substituted text is
/// never scanned for further placeholders.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        rest = &rest[start..];
        match values.iter().find(|(placeholder, _)| rest.starts_with(placeholder)) {
            Some((placeholder, value)) => {
                output.push_str(value);
                rest = &rest[placeholder.len()..];
            }
            None => {
                output.push('{');
                rest = &rest[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
