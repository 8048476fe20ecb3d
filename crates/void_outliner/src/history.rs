//! Undo/redo history with a linear cursor and transaction support.
//!
//! Every reversible edit is recorded as a [`CommandEntry`]: a pair of
//! opposing closures plus an optional shared side effect. The stack never
//! touches the scene itself; it only replays the closures it was given
//! against the context passed to [`CommandStack::undo`] / [`CommandStack::redo`].

use std::cell::RefCell;
use std::rc::Rc;

/// Closure run against the editing context.
pub type Action<C> = Box<dyn FnMut(&mut C)>;

/// One reversible user action.
pub struct CommandEntry<C> {
    description: String,
    undo: Action<C>,
    redo: Action<C>,
    /// Runs after either direction, typically a tree refresh.
    common: Option<Action<C>>,
    scope: Option<String>,
}

impl<C> CommandEntry<C> {
    pub fn new(
        description: impl Into<String>,
        undo: impl FnMut(&mut C) + 'static,
        redo: impl FnMut(&mut C) + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            undo: Box::new(undo),
            redo: Box::new(redo),
            common: None,
            scope: None,
        }
    }

    pub fn with_common(mut self, common: impl FnMut(&mut C) + 'static) -> Self {
        self.common = Some(Box::new(common));
        self
    }

    /// Tag the entry so it can be purged with [`CommandStack::clear_scope`].
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    fn run_undo(&mut self, ctx: &mut C) {
        (self.undo)(ctx);
        self.run_common(ctx);
    }

    fn run_redo(&mut self, ctx: &mut C) {
        (self.redo)(ctx);
        self.run_common(ctx);
    }

    fn run_common(&mut self, ctx: &mut C) {
        if let Some(common) = self.common.as_mut() {
            common(ctx);
        }
    }
}

impl<C> std::fmt::Debug for CommandEntry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("description", &self.description)
            .field("scope", &self.scope)
            .field("has_common", &self.common.is_some())
            .finish()
    }
}

/// A group of entries recorded as a single undoable unit.
pub struct Transaction<C> {
    pub name: String,
    pub entries: Vec<CommandEntry<C>>,
}

impl<C> Transaction<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: CommandEntry<C>) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scope shared by every entry, if they all carry the same one.
    fn shared_scope(&self) -> Option<String> {
        let first = self.entries.first()?.scope()?;
        if self.entries.iter().all(|e| e.scope() == Some(first)) {
            Some(first.to_string())
        } else {
            log::warn!(
                "Transaction \"{}\" mixes scopes, recording it unscoped",
                self.name
            );
            None
        }
    }
}

impl<C: 'static> Transaction<C> {
    /// Fold the transaction into one entry. Undo runs the inner undos in
    /// reverse order, redo runs the inner redos in order; inner side effects
    /// run once each after the batch. The entry keeps the inner scope when
    /// all inner entries agree on it.
    fn into_entry(self) -> CommandEntry<C> {
        let scope = self.shared_scope();
        let entries = Rc::new(RefCell::new(self.entries));
        let undo_entries = Rc::clone(&entries);
        let redo_entries = entries;

        let entry = CommandEntry::new(
            self.name,
            move |ctx: &mut C| {
                let mut entries = undo_entries.borrow_mut();
                for entry in entries.iter_mut().rev() {
                    (entry.undo)(ctx);
                }
                for entry in entries.iter_mut() {
                    entry.run_common(ctx);
                }
            },
            move |ctx: &mut C| {
                let mut entries = redo_entries.borrow_mut();
                for entry in entries.iter_mut() {
                    (entry.redo)(ctx);
                }
                for entry in entries.iter_mut() {
                    entry.run_common(ctx);
                }
            },
        );
        match scope {
            Some(scope) => entry.with_scope(scope),
            None => entry,
        }
    }
}

/// Linear, bounded undo/redo history.
///
/// `cursor` counts the entries currently applied: entries before it can be
/// undone, entries from it onward can be redone.
pub struct CommandStack<C> {
    entries: Vec<CommandEntry<C>>,
    cursor: usize,
    /// Maximum history size
    max_size: usize,
    /// Current open transaction
    current_transaction: Option<Transaction<C>>,
    /// Whether history has been modified since last save
    dirty: bool,
}

impl<C: 'static> Default for CommandStack<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> CommandStack<C> {
    /// Default maximum history size.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_size: max_size.max(1),
            current_transaction: None,
            dirty: false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Description of the entry the next undo would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(CommandEntry::description)
    }

    /// Description of the entry the next redo would reapply.
    pub fn redo_description(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(CommandEntry::description)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark as saved (clears dirty flag).
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Begin a new transaction.
    /// Entries pushed during a transaction are grouped as one undo unit.
    pub fn begin_transaction(&mut self, name: impl Into<String>) {
        if self.current_transaction.is_some() {
            log::warn!("Beginning transaction while one is already open");
        }
        self.current_transaction = Some(Transaction::new(name));
    }

    /// Commit the current transaction.
    pub fn commit_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            if !transaction.is_empty() {
                self.push_entry(transaction.into_entry());
            }
        }
    }

    /// Drop the current transaction without recording it. Its forward
    /// mutations are not reverted.
    pub fn rollback_transaction(&mut self) {
        self.current_transaction = None;
    }

    /// Check if a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.current_transaction.is_some()
    }

    /// Record an entry whose forward action the caller already performed.
    ///
    /// Discards everything past the cursor, appends, and evicts the oldest
    /// entry when the history is full. The entry's closures are not run.
    pub fn push(&mut self, entry: CommandEntry<C>) {
        if let Some(ref mut transaction) = self.current_transaction {
            transaction.push(entry);
        } else {
            self.push_entry(entry);
        }
    }

    fn push_entry(&mut self, entry: CommandEntry<C>) {
        log::debug!("Recording \"{}\"", entry.description());

        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        self.cursor += 1;
        self.dirty = true;

        // Trim if over limit
        while self.entries.len() > self.max_size {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Run the entry's forward action and side effect, then record it.
    pub fn execute(&mut self, mut entry: CommandEntry<C>, ctx: &mut C) {
        entry.run_redo(ctx);
        self.push(entry);
    }

    /// Revert the entry before the cursor. Returns `false` at the start of
    /// the history.
    pub fn undo(&mut self, ctx: &mut C) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let entry = &mut self.entries[self.cursor - 1];
        log::debug!("Undo \"{}\"", entry.description());
        entry.run_undo(ctx);
        self.cursor -= 1;
        self.dirty = true;
        true
    }

    /// Reapply the entry at the cursor. Returns `false` at the tail.
    pub fn redo(&mut self, ctx: &mut C) -> bool {
        if self.cursor >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        let entry = &mut self.entries[self.cursor - 1];
        log::debug!("Redo \"{}\"", entry.description());
        entry.run_redo(ctx);
        self.dirty = true;
        true
    }

    /// Remove every entry tagged with `scope`, keeping the order of the
    /// others. The cursor moves back once per removed applied entry.
    pub fn clear_scope(&mut self, scope: &str) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].scope() == Some(scope) {
                self.entries.remove(index);
                if index < self.cursor {
                    self.cursor -= 1;
                }
                removed += 1;
            } else {
                index += 1;
            }
        }
        if removed > 0 {
            log::debug!("Purged {} entries of scope \"{}\"", removed, scope);
        }
        removed
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.current_transaction = None;
        self.dirty = false;
    }
}
