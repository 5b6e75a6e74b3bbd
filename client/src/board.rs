use std::collections::HashMap;

use wasm_bindgen::JsValue;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use pixelwall_shared::grid::BoardGrid;
use pixelwall_shared::{Color, Coord};

/// The board's single source of visual truth: the color map plus the cell
/// elements it paints. Built once at startup from the page's `.cell`
/// elements keyed by their `data-x`/`data-y` attributes.
pub struct BoardView {
    grid: BoardGrid,
    cells: HashMap<Coord, HtmlElement>,
}

impl BoardView {
    pub fn from_document(document: &Document) -> Result<Self, JsValue> {
        let nodes = document.query_selector_all(".cell")?;
        let mut cells = HashMap::new();
        let mut width = 0;
        let mut height = 0;
        for index in 0..nodes.length() {
            let Some(node) = nodes.get(index) else {
                continue;
            };
            let Ok(element) = node.dyn_into::<HtmlElement>() else {
                continue;
            };
            let Some(coord) = cell_coord(element.as_ref()) else {
                continue;
            };
            width = width.max(coord.x + 1);
            height = height.max(coord.y + 1);
            cells.insert(coord, element);
        }
        Ok(Self {
            grid: BoardGrid::new(width, height),
            cells,
        })
    }

    /// Overwrite one cell; last caller wins. A coordinate outside the
    /// rendered grid is a silent no-op.
    pub fn set_cell(&mut self, coord: Coord, color: Color) {
        let Some(cell) = self.cells.get(&coord) else {
            return;
        };
        self.grid.set(coord, color);
        let _ = cell.style().set_property("background-color", &color.css());
    }

    pub fn grid(&self) -> &BoardGrid {
        &self.grid
    }
}

pub fn cell_coord(element: &Element) -> Option<Coord> {
    let x = element.get_attribute("data-x")?.trim().parse().ok()?;
    let y = element.get_attribute("data-y")?.trim().parse().ok()?;
    Some(Coord::new(x, y))
}
