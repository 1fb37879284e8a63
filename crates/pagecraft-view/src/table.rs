//! Table block: row/column discovery, the cell context menu, and cell
//! geometry.

use pagecraft_model::{Block, BlockIndex, Coded};
use pagecraft_store::{CommonStore, MenuDirection, MenuParam, Rect, to_camel_case};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Result, ViewError};
use crate::rpc::{Command, CommandSink};

/// Context menu of rows, columns and cells.
pub const OPTIONS_MENU: &str = "select1";

/// Submenus opened from the context menu.
pub const SUB_MENU_IDS: [&str; 3] = ["select2", "blockColor", "blockBackground"];

/// Widest a column can be resized to.
pub const MAX_COLUMN_WIDTH: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableAlign {
    Left,
    Center,
    Right,
    Top,
    Bottom,
}

impl TableAlign {
    pub const HORIZONTAL: [TableAlign; 3] = [TableAlign::Left, TableAlign::Center, TableAlign::Right];
    pub const VERTICAL: [TableAlign; 3] = [TableAlign::Top, TableAlign::Center, TableAlign::Bottom];

    pub fn name(&self) -> &'static str {
        match self {
            TableAlign::Left => "Left",
            TableAlign::Center => "Center",
            TableAlign::Right => "Right",
            TableAlign::Top => "Top",
            TableAlign::Bottom => "Bottom",
        }
    }

    /// Icon class suffix.
    pub fn icon(&self) -> &'static str {
        match self {
            TableAlign::Left => "left",
            TableAlign::Center => "center",
            TableAlign::Right => "right",
            TableAlign::Top => "top",
            TableAlign::Bottom => "bottom",
        }
    }
}

/// Entry of a select menu.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOption {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// Class of the swatch drawn inside the item.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub inner: String,
    pub arrow: bool,
    pub is_div: bool,
}

impl MenuOption {
    pub fn item(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn div() -> Self {
        Self {
            is_div: true,
            ..Self::default()
        }
    }

    fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    fn inner(mut self, inner: impl Into<String>) -> Self {
        self.inner = inner.into();
        self
    }

    fn arrow(mut self) -> Self {
        self.arrow = true;
        self
    }
}

/// Row and column blocks of a table.
#[derive(Debug)]
pub struct TableData<'a> {
    pub columns: Vec<&'a Block>,
    pub rows: Vec<&'a Block>,
}

/// Find the column and row containers under a table block.
pub fn table_data<'a>(index: &'a BlockIndex, root_id: &str, block_id: &str) -> Result<TableData<'a>> {
    let children = index.get_children(root_id, block_id, |_| true);
    let container = |predicate: fn(&Block) -> bool, name: &'static str| {
        children
            .iter()
            .find(|b| predicate(**b))
            .copied()
            .ok_or_else(|| ViewError::MissingContainer {
                block_id: block_id.to_string(),
                container: name,
            })
    };
    let columns = container(Block::is_layout_table_columns, "columns")?;
    let rows = container(Block::is_layout_table_rows, "rows")?;

    Ok(TableData {
        columns: index.get_children(root_id, &columns.id, Block::is_table_column),
        rows: index.get_children(root_id, &rows.id, Block::is_table_row),
    })
}

/// Context menu entries for a row, column or cell.
pub fn options_for(current: &Block, data: &TableData<'_>) -> Vec<MenuOption> {
    let column_count = data.columns.len();
    let row_count = data.rows.len();

    let align = vec![
        MenuOption::item("horizontal", "Horizontal align")
            .icon(format!("align {}", TableAlign::Left.icon()))
            .arrow(),
        MenuOption::item("vertical", "Vertical align")
            .icon(format!("align {}", TableAlign::Top.icon()))
            .arrow(),
    ];

    let mut column = vec![
        MenuOption::item("columnBefore", "Column before"),
        MenuOption::item("columnAfter", "Column after"),
    ];
    if column_count > 1 {
        column.push(MenuOption::item("columnRemove", "Remove column"));
    }
    column.push(MenuOption::div());

    let mut row = vec![
        MenuOption::item("rowBefore", "Row before"),
        MenuOption::item("rowAfter", "Row after"),
    ];
    if row_count > 0 {
        row.push(MenuOption::item("rowRemove", "Remove row"));
    }
    row.push(MenuOption::div());

    let color = vec![
        MenuOption::item("color", "Color")
            .icon("color")
            .inner(format!("inner textColor textColor-{}", or_default(text_color(current))))
            .arrow(),
        MenuOption::item("background", "Background")
            .icon("color")
            .inner(format!("inner bgColor bgColor-{}", or_default(&current.bg_color)))
            .arrow(),
        MenuOption::div(),
    ];

    let groups: Vec<Vec<MenuOption>> = if current.is_table_row() {
        vec![color, row, align]
    } else if current.is_table_column() {
        vec![color, column, align]
    } else if current.is_table_cell() {
        vec![color, row, column, align]
    } else {
        vec![align]
    };
    groups.into_iter().flatten().collect()
}

pub fn align_options(aligns: [TableAlign; 3]) -> Vec<MenuOption> {
    aligns
        .iter()
        .map(|a| MenuOption::item(a.icon(), a.name()).icon(format!("align {}", a.icon())))
        .collect()
}

/// Action picked from the context menu. Items with submenus are not actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    ColumnBefore,
    ColumnAfter,
    ColumnRemove,
    RowBefore,
    RowAfter,
    RowRemove,
}

impl TableAction {
    pub fn from_option(option: &MenuOption) -> Option<Self> {
        if option.arrow {
            return None;
        }
        match option.id.as_str() {
            "columnBefore" => Some(TableAction::ColumnBefore),
            "columnAfter" => Some(TableAction::ColumnAfter),
            "columnRemove" => Some(TableAction::ColumnRemove),
            "rowBefore" => Some(TableAction::RowBefore),
            "rowAfter" => Some(TableAction::RowAfter),
            "rowRemove" => Some(TableAction::RowRemove),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Text,
    Background,
}

/// Menu handling of one table block.
#[derive(Debug, Clone)]
pub struct TableMenus {
    root_id: String,
    block_id: String,
}

impl TableMenus {
    pub fn new(root_id: impl Into<String>, block_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            block_id: block_id.into(),
        }
    }

    /// Open the context menu of `id` at the pointer.
    pub fn open_options(
        &self,
        index: &BlockIndex,
        common: &mut CommonStore,
        id: &str,
        x: f64,
        y: f64,
    ) -> Result<()> {
        let current = index
            .get_leaf(&self.root_id, id)
            .ok_or_else(|| ViewError::MissingBlock {
                root_id: self.root_id.clone(),
                id: id.to_string(),
            })?;
        let data = table_data(index, &self.root_id, &self.block_id)?;
        let options = options_for(current, &data);

        let param = MenuParam {
            component: "select".to_string(),
            rect: Some(Rect::new(x, y, 1.0, 1.0)),
            offset_y: 10.0,
            horizontal: MenuDirection::Center,
            sub_ids: SUB_MENU_IDS.iter().map(|s| (*s).to_string()).collect(),
            ..MenuParam::new()
        }
        .with_data(json!({ "blockId": id, "options": options }));
        common.menu_open(OPTIONS_MENU, param);
        Ok(())
    }

    /// Hovering an item: open its submenu, or close submenus for plain items.
    pub fn on_option_over(
        &self,
        index: &BlockIndex,
        common: &mut CommonStore,
        current_id: &str,
        option: &MenuOption,
        menu_width: f64,
    ) {
        if !option.arrow {
            common.menu_close_all(Some(&SUB_MENU_IDS[..]), None);
            return;
        }
        let Some(current) = index.get_leaf(&self.root_id, current_id) else {
            return;
        };

        let (menu_id, component, value, options) = match option.id.as_str() {
            "horizontal" => (
                "select2",
                "select",
                Value::from(current.align.code()),
                Some(align_options(TableAlign::HORIZONTAL)),
            ),
            "vertical" => ("select2", "select", Value::Null, Some(align_options(TableAlign::VERTICAL))),
            "color" => ("blockColor", "", Value::from(text_color(current)), None),
            "background" => ("blockBackground", "", Value::from(current.bg_color.as_str()), None),
            _ => return,
        };

        let mut data = json!({ "blockId": current_id, "value": value });
        if let Some(options) = options {
            data["options"] = json!(options);
        }
        let param = MenuParam {
            component: component.to_string(),
            element: format!("#{} #item-{}", to_camel_case(&format!("menu-{OPTIONS_MENU}")), option.id),
            offset_x: menu_width,
            vertical: MenuDirection::Center,
            is_sub: true,
            ..MenuParam::new()
        }
        .with_data(data);
        common.menu_close_all_and_open(Some(&SUB_MENU_IDS[..]), menu_id, param);
    }

    /// A color was picked in a color submenu.
    pub fn on_color_change(
        &self,
        common: &mut CommonStore,
        sink: &dyn CommandSink,
        block_id: &str,
        target: ColorTarget,
        color: &str,
    ) {
        let root_id = self.root_id.clone();
        let block_ids = vec![block_id.to_string()];
        let color = color.to_string();
        debug!(block_id, ?target, %color, "table color");
        sink.send(match target {
            ColorTarget::Text => Command::BlockTextListSetColor {
                root_id,
                block_ids,
                color,
            },
            ColorTarget::Background => Command::BlockListSetBackgroundColor {
                root_id,
                block_ids,
                color,
            },
        });
        common.menu_close(OPTIONS_MENU, None);
    }

    /// An alignment was picked.
    pub fn on_align_select(&self, common: &mut CommonStore) {
        common.menu_close(OPTIONS_MENU, None);
    }
}

/// Background of a cell: its own, else its column's, else its row's.
pub fn cell_background<'a>(cell: &'a Block, column: &'a Block, row: &'a Block) -> Option<&'a str> {
    [cell, column, row]
        .into_iter()
        .map(|b| b.bg_color.as_str())
        .find(|c| !c.is_empty())
}

pub fn cell_class(cell: &Block, column: &Block, row: &Block, is_head: bool) -> Vec<String> {
    let mut class = vec!["cell".to_string(), format!("column{}", cell.id)];
    if is_head {
        class.push("isHead".to_string());
    }
    let color = text_color(cell);
    if !color.is_empty() {
        class.push(format!("textColor textColor-{color}"));
    }
    if let Some(bg) = cell_background(cell, column, row) {
        class.push(format!("bgColor bgColor-{bg}"));
    }
    class
}

/// Equal share of the table width per column, in percent.
pub fn column_width_percent(columns: usize) -> f64 {
    if columns == 0 {
        return 100.0;
    }
    100.0 / columns as f64
}

/// Column width while resizing, clamped to `[min, 500]`.
pub fn resize_width(pointer_x: f64, column_left: f64, min: f64) -> f64 {
    min.max(MAX_COLUMN_WIDTH.min(pointer_x - column_left))
}

fn text_color(block: &Block) -> &str {
    block
        .content
        .as_text()
        .map_or("", |text| text.color.as_str())
}

fn or_default(color: &str) -> &str {
    if color.is_empty() { "default" } else { color }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_is_clamped() {
        assert_eq!(resize_width(700.0, 100.0, 50.0), 500.0);
        assert_eq!(resize_width(120.0, 100.0, 50.0), 50.0);
        assert_eq!(resize_width(300.0, 100.0, 50.0), 200.0);
    }

    #[test]
    fn column_width_splits_evenly() {
        assert_eq!(column_width_percent(4), 25.0);
        assert_eq!(column_width_percent(0), 100.0);
    }

    #[test]
    fn align_icons() {
        let names: Vec<_> = align_options(TableAlign::VERTICAL)
            .into_iter()
            .map(|o| o.icon)
            .collect();
        assert_eq!(names, vec!["align top", "align center", "align bottom"]);
    }

    #[test]
    fn only_plain_items_are_actions() {
        assert_eq!(
            TableAction::from_option(&MenuOption::item("rowRemove", "Remove row")),
            Some(TableAction::RowRemove)
        );
        let color = MenuOption::item("color", "Color").arrow();
        assert_eq!(TableAction::from_option(&color), None);
    }
}
