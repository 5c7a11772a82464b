use crate::models::WorldDocument;

/// Generated worlds in creation order with a cursor on the current one.
/// Behaves like a browser history: generating after stepping back drops the
/// worlds ahead of the cursor.
#[derive(Debug, Clone, Default)]
pub struct WorldHistory {
    worlds: Vec<WorldDocument>,
    cursor: Option<usize>,
}

impl WorldHistory {
    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&WorldDocument> {
        self.cursor.and_then(|i| self.worlds.get(i))
    }

    pub fn current_mut(&mut self) -> Option<&mut WorldDocument> {
        self.cursor.and_then(move |i| self.worlds.get_mut(i))
    }

    /// Drops everything after the cursor, appends `world` and makes it current.
    pub fn push(&mut self, world: WorldDocument) {
        let keep = self.cursor.map_or(0, |i| i + 1);
        self.worlds.truncate(keep);
        self.worlds.push(world);
        self.cursor = Some(self.worlds.len() - 1);
    }

    /// Swaps the world at `index` in place. Returns false if there is none.
    pub fn replace(&mut self, index: usize, world: WorldDocument) -> bool {
        match self.worlds.get_mut(index) {
            Some(slot) => {
                *slot = world;
                true
            }
            None => false,
        }
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.cursor, Some(i) if i > 0)
    }

    pub fn can_go_next(&self) -> bool {
        matches!(self.cursor, Some(i) if i + 1 < self.worlds.len())
    }

    pub fn go_previous(&mut self) -> bool {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    pub fn go_next(&mut self) -> bool {
        match self.cursor {
            Some(i) if i + 1 < self.worlds.len() => {
                self.cursor = Some(i + 1);
                true
            }
            _ => false,
        }
    }
}
