//! # Text Map
//!
//! A [`TileMap`] whose cells are character codes, with line/character editing
//! and a synchronous change-notification channel.
//!
//! Cell values are interpreted as follows: `0` is empty, `32` is a space and
//! anything above `32` is a visible glyph.
//!
//! Every editing call that completes fires exactly one notification, after the
//! grid has been updated, to all current subscribers in subscription order.
//! Calls rejected with an error leave the grid untouched and notify nobody.

use crate::{LetterfallError, LetterfallResult, TileMap, EMPTY_CELL};
use std::fmt;
use std::ops::Deref;

/// Character code of a space.
pub const SPACE: i32 = 32;

/// Returns true for character codes that draw a glyph.
pub fn is_visible_char(code: i32) -> bool {
    code > SPACE
}

/// Handle returned by [`TextMap::subscribe`].
pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&TextMap)>;

/// Ordered list of change subscribers.
#[derive(Default)]
struct ChangeListeners {
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl fmt::Debug for ChangeListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeListeners")
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

/// Editable grid of character codes.
///
/// Read access to the underlying grid is available through `Deref<Target =
/// TileMap>`; all writes go through the editing methods so that no mutation can
/// skip its notification.
///
/// # Examples
///
/// ```
/// use letterfall::TextMap;
///
/// let mut text = TextMap::new(10, 16, 12).unwrap();
/// text.put_text(0, 3, "ABC").unwrap();
/// assert_eq!(text.get_line(3).unwrap(), "ABC");
/// ```
#[derive(Debug)]
pub struct TextMap {
    grid: TileMap,
    listeners: ChangeListeners,
}

impl Deref for TextMap {
    type Target = TileMap;

    fn deref(&self) -> &TileMap {
        &self.grid
    }
}

impl TextMap {
    /// Creates an empty text map.
    pub fn new(tilesize: i32, width: usize, height: usize) -> LetterfallResult<Self> {
        Ok(Self {
            grid: TileMap::new(tilesize, width, height)?,
            listeners: ChangeListeners::default(),
        })
    }

    /// The underlying cell grid.
    pub fn tiles(&self) -> &TileMap {
        &self.grid
    }

    /// Registers a subscriber called after every completed edit.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&TextMap) + 'static,
    {
        let id = self.listeners.next_id;
        self.listeners.next_id += 1;
        self.listeners.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a subscriber. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.listeners.len();
        self.listeners.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.listeners.len() != before
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.listeners.len()
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(self);
        }
        self.listeners.listeners = listeners;
    }

    /// Writes `text` left to right from `(x, y)`, overwriting what was there.
    ///
    /// The rest of the row is left alone. Fails without writing anything if the
    /// text would run past the right edge.
    pub fn put_text(&mut self, x: i32, y: i32, text: &str) -> LetterfallResult<()> {
        self.write_text(x, y, text)?;
        self.notify();
        Ok(())
    }

    fn write_text(&mut self, x: i32, y: i32, text: &str) -> LetterfallResult<()> {
        let codes: Vec<i32> = text.chars().map(|c| c as i32).collect();
        self.check_text_fits(x, y, codes.len())?;
        let row = self.grid.row_mut(y)?;
        let start = x as usize;
        row[start..start + codes.len()].copy_from_slice(&codes);
        Ok(())
    }

    fn check_text_fits(&self, x: i32, y: i32, len: usize) -> LetterfallResult<()> {
        self.grid.check_row(y)?;
        if x < 0 || x as usize > self.grid.width() {
            return Err(self.grid.out_of_bounds(x, y));
        }
        if x as usize + len > self.grid.width() {
            return Err(LetterfallError::TextOverflow {
                x,
                len,
                width: self.grid.width(),
            });
        }
        Ok(())
    }

    /// Writes a single character code at `(x, y)`.
    pub fn place(&mut self, x: i32, y: i32, code: i32) -> LetterfallResult<()> {
        self.grid.set(x, y, code)?;
        self.notify();
        Ok(())
    }

    /// Opens an empty cell at `(x, y)`, pushing the rest of the row right.
    ///
    /// The character in the last column falls off the row.
    pub fn insert_char(&mut self, x: i32, y: i32) -> LetterfallResult<()> {
        if !self.grid.in_bounds(x, y) {
            return Err(self.grid.out_of_bounds(x, y));
        }
        let row = self.grid.row_mut(y)?;
        let x = x as usize;
        let last = row.len() - 1;
        row.copy_within(x..last, x + 1);
        row[x] = EMPTY_CELL;
        self.notify();
        Ok(())
    }

    /// Removes the cell at `(x, y)`, pulling the rest of the row left.
    ///
    /// The last column becomes empty.
    pub fn delete_char(&mut self, x: i32, y: i32) -> LetterfallResult<()> {
        if !self.grid.in_bounds(x, y) {
            return Err(self.grid.out_of_bounds(x, y));
        }
        let row = self.grid.row_mut(y)?;
        let x = x as usize;
        let last = row.len() - 1;
        row.copy_within(x + 1.., x);
        row[last] = EMPTY_CELL;
        self.notify();
        Ok(())
    }

    /// Inserts an empty line at row `y`.
    ///
    /// Rows `1..=y` move one row up toward row 0, whose content is discarded;
    /// row `y` is then cleared. Rows below `y` are unaffected.
    pub fn insert_line(&mut self, y: i32) -> LetterfallResult<()> {
        self.scroll_up_to(y)?;
        self.notify();
        Ok(())
    }

    fn scroll_up_to(&mut self, y: i32) -> LetterfallResult<()> {
        let y = self.grid.check_row(y)?;
        for row in 0..y {
            self.grid.copy_row(row + 1, row);
        }
        self.grid.clear_row(y);
        Ok(())
    }

    /// Deletes line `y`.
    ///
    /// Rows `0..y` move one row down to fill the gap and row 0 is cleared.
    /// Rows below `y` are unaffected.
    pub fn delete_line(&mut self, y: i32) -> LetterfallResult<()> {
        let y = self.grid.check_row(y)?;
        for row in (1..=y).rev() {
            self.grid.copy_row(row - 1, row);
        }
        self.grid.clear_row(0);
        self.notify();
        Ok(())
    }

    /// Appends `text` as a new bottom line.
    ///
    /// Equivalent to `insert_line(height - 1)` followed by
    /// `put_text(0, height - 1, text)`, but validated up front and notified once.
    pub fn add_line(&mut self, text: &str) -> LetterfallResult<()> {
        let bottom = self.grid.height() as i32 - 1;
        self.check_text_fits(0, bottom, text.chars().count())?;
        self.scroll_up_to(bottom)?;
        self.write_text(0, bottom, text)?;
        self.notify();
        Ok(())
    }

    /// Reconstructs row `y` as text, trimmed after its last visible character.
    ///
    /// Empty cells contribute nothing, so a fully empty row yields `""`.
    /// Column positions are therefore not preserved across empty cells: a gap
    /// opened by [`insert_char`](Self::insert_char) does not show in the line.
    pub fn get_line(&self, y: i32) -> LetterfallResult<String> {
        let row = self.grid.row(y)?;
        let end = match row.iter().rposition(|&c| is_visible_char(c)) {
            Some(last) => last + 1,
            None => return Ok(String::new()),
        };
        Ok(row[..end]
            .iter()
            .filter(|&&c| c != EMPTY_CELL)
            .map(|&c| {
                u32::try_from(c)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect())
    }

    /// Every line of the map, top to bottom.
    pub fn get_text(&self) -> Vec<String> {
        (0..self.grid.height() as i32)
            .map(|y| self.get_line(y).unwrap_or_default())
            .collect()
    }
}
