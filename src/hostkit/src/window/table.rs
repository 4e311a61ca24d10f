use std::any::{self, Any, TypeId};
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::window::{Window, WindowError, WindowRef};

pub struct WindowEntry {
    type_id: TypeId,
    type_name: &'static str,
    window: Arc<Mutex<dyn Window>>,
    handle: Arc<dyn Any + Send + Sync>,
    visible: bool,
}

impl WindowEntry {
    fn new<T: Window>(window: Arc<Mutex<T>>, visible: bool) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            window: Arc::clone(&window) as Arc<Mutex<dyn Window>>,
            handle: window,
            visible,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn window(&self) -> &Arc<Mutex<dyn Window>> {
        &self.window
    }

    fn is<T: Window>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// Windows in registration order, together with their visibility and the
/// window currently being drawn.
pub struct WindowTable {
    entries: Vec<WindowEntry>,
    drawing: Option<usize>,
}

impl WindowTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            drawing: None,
        }
    }

    pub fn push<T: Window>(&mut self, window: Arc<Mutex<T>>, visible: bool) {
        self.entries.push(WindowEntry::new(window, visible));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_visible<T: Window>(&self) -> Result<bool, WindowError> {
        self.find::<T>().map(|entry| entry.visible)
    }

    pub fn set_visible<T: Window>(&mut self, visible: bool) -> Result<(), WindowError> {
        self.find_mut::<T>()?.visible = visible;
        Ok(())
    }

    pub fn toggle<T: Window>(&mut self) -> Result<bool, WindowError> {
        let entry = self.find_mut::<T>()?;
        entry.visible = !entry.visible;
        Ok(entry.visible)
    }

    pub fn reference<T: Window>(&self) -> Result<WindowRef<T>, WindowError> {
        let entry = self.find::<T>()?;
        Arc::clone(&entry.handle)
            .downcast::<Mutex<T>>()
            .map(WindowRef::new)
            .map_err(|_| WindowError::not_found::<T>())
    }

    /// Like [`WindowTable::reference`], but refuses to hand out the window
    /// being drawn, whose lock is held by the draw pass.
    pub fn request_reference<T: Window>(&self) -> Result<WindowRef<T>, WindowError> {
        let index = self.position::<T>()?;
        if self.drawing == Some(index) {
            return Err(WindowError::being_drawn::<T>());
        }
        self.reference::<T>()
    }

    pub fn set_drawing(&mut self, drawing: Option<usize>) {
        self.drawing = drawing;
    }

    /// Returns the position and window of every currently visible entry.
    pub fn visible_windows(&self) -> Vec<(usize, Arc<Mutex<dyn Window>>)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.visible)
            .map(|(index, entry)| (index, Arc::clone(&entry.window)))
            .collect()
    }

    pub fn set_visible_at(&mut self, index: usize, visible: bool) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.visible = visible;
        }
    }

    pub fn take_entries(&mut self) -> Vec<WindowEntry> {
        self.drawing = None;
        mem::take(&mut self.entries)
    }

    fn position<T: Window>(&self) -> Result<usize, WindowError> {
        self.entries
            .iter()
            .position(|entry| entry.is::<T>())
            .ok_or_else(WindowError::not_found::<T>)
    }

    fn find<T: Window>(&self) -> Result<&WindowEntry, WindowError> {
        self.entries
            .iter()
            .find(|entry| entry.is::<T>())
            .ok_or_else(WindowError::not_found::<T>)
    }

    fn find_mut<T: Window>(&mut self) -> Result<&mut WindowEntry, WindowError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.is::<T>())
            .ok_or_else(WindowError::not_found::<T>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct First(u32);

    impl Window for First {
        fn draw(&mut self, _visible: &mut bool) -> Result<(), WindowError> {
            Ok(())
        }
    }

    struct Second;

    impl Window for Second {
        fn draw(&mut self, _visible: &mut bool) -> Result<(), WindowError> {
            Ok(())
        }
    }

    struct Unregistered;

    impl Window for Unregistered {
        fn draw(&mut self, _visible: &mut bool) -> Result<(), WindowError> {
            Ok(())
        }
    }

    fn table() -> WindowTable {
        let mut table = WindowTable::new();
        table.push(Arc::new(Mutex::new(First(1))), false);
        table.push(Arc::new(Mutex::new(Second)), true);
        table.push(Arc::new(Mutex::new(First(2))), true);
        table
    }

    #[test]
    fn window_table_set_visible_succeeds_on_first_match() {
        let mut table = table();
        table.set_visible::<First>(true).unwrap();

        let indices: Vec<_> = table
            .visible_windows()
            .into_iter()
            .map(|(index, _)| index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);

        table.set_visible::<First>(false).unwrap();
        assert!(!table.is_visible::<First>().unwrap());
        assert!(table.is_visible::<Second>().unwrap());
    }

    #[test]
    fn window_table_toggle_succeeds() {
        let mut table = table();

        assert!(!table.toggle::<Second>().unwrap());
        assert!(table.toggle::<Second>().unwrap());
    }

    #[test]
    fn window_table_reference_succeeds_on_first_match() {
        let table = table();

        let first = table.reference::<First>().unwrap();
        assert_eq!(first.lock().0, 1);
    }

    #[test]
    fn window_table_lookup_fails_when_type_not_registered() {
        let mut table = table();

        assert!(matches!(
            table.set_visible::<Unregistered>(true),
            Err(WindowError::NotFound { .. })
        ));
        assert!(table.toggle::<Unregistered>().is_err());
        assert!(table.is_visible::<Unregistered>().is_err());
        assert!(table.reference::<Unregistered>().is_err());
    }

    #[test]
    fn window_table_request_reference_fails_when_window_is_being_drawn() {
        let mut table = table();
        table.set_drawing(Some(1));

        assert!(matches!(
            table.request_reference::<Second>(),
            Err(WindowError::BeingDrawn { .. })
        ));
        assert!(table.request_reference::<First>().is_ok());
        assert!(table.reference::<Second>().is_ok());

        table.set_drawing(None);
        assert!(table.request_reference::<Second>().is_ok());
    }

    #[test]
    fn window_table_take_entries_succeeds_in_registration_order() {
        let mut table = table();

        let names: Vec<_> = table
            .take_entries()
            .iter()
            .map(WindowEntry::type_name)
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names[1].ends_with("Second"));
        assert_eq!(table.len(), 0);
    }
}
