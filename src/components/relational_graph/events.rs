use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;

use log::warn;

use super::error::InvalidEventError;
use super::model::ItemKind;

/// Notifications published by a graph instance.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	BeforeLoad,
	/// Progressive layout progress, 1 to 100.
	Loading(u8),
	Loaded,
	Drawn,
	Zoomed(f64),
	ItemClicked { id: String, kind: ItemKind },
}

impl GraphEvent {
	pub fn kind(&self) -> EventKind {
		match self {
			GraphEvent::BeforeLoad => EventKind::BeforeLoad,
			GraphEvent::Loading(_) => EventKind::Loading,
			GraphEvent::Loaded => EventKind::Loaded,
			GraphEvent::Drawn => EventKind::Drawn,
			GraphEvent::Zoomed(_) => EventKind::Zoomed,
			GraphEvent::ItemClicked { .. } => EventKind::ItemClicked,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
	BeforeLoad,
	Loading,
	Loaded,
	Drawn,
	Zoomed,
	ItemClicked,
}

impl FromStr for EventKind {
	type Err = InvalidEventError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Ok(match name {
			"before-load" | "BEFORE_LOAD" => EventKind::BeforeLoad,
			"loading" | "LOADING" => EventKind::Loading,
			"loaded" | "LOADED" => EventKind::Loaded,
			"drawn" | "DREW" => EventKind::Drawn,
			"zoomed" | "ZOOMED" => EventKind::Zoomed,
			"item-clicked" | "ITEM_CLICK" => EventKind::ItemClicked,
			other => return Err(InvalidEventError(other.to_string())),
		})
	}
}

/// Handle returned on subscription, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&GraphEvent)>;

/// In-process publish/subscribe owned by one graph instance.
///
/// Listeners run in registration order. A listener that panics is logged and skipped; the
/// remaining listeners still receive the event.
#[derive(Default)]
pub struct EventBus {
	listeners: Vec<(ListenerId, EventKind, Listener)>,
	next_id: u64,
}

impl fmt::Debug for EventBus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventBus")
			.field("listeners", &self.listeners.len())
			.finish()
	}
}

impl EventBus {
	pub fn subscribe(
		&mut self,
		kind: EventKind,
		listener: impl FnMut(&GraphEvent) + 'static,
	) -> ListenerId {
		let id = ListenerId(self.next_id);
		self.next_id += 1;
		self.listeners.push((id, kind, Box::new(listener)));
		id
	}

	/// Subscribe by event name.
	pub fn on(
		&mut self,
		name: &str,
		listener: impl FnMut(&GraphEvent) + 'static,
	) -> Result<ListenerId, InvalidEventError> {
		let kind = name.parse()?;
		Ok(self.subscribe(kind, listener))
	}

	pub fn off(&mut self, id: ListenerId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(lid, _, _)| *lid != id);
		self.listeners.len() != before
	}

	pub fn emit(&mut self, event: GraphEvent) {
		let kind = event.kind();
		for (id, _, listener) in self.listeners.iter_mut().filter(|(_, k, _)| *k == kind) {
			if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
				warn!("listener {id:?} panicked while handling {kind:?}");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn unknown_names_are_rejected() {
		let mut bus = EventBus::default();
		assert_eq!(
			bus.on("exploded", |_| {}).unwrap_err(),
			InvalidEventError("exploded".into())
		);
		assert!(bus.on("zoomed", |_| {}).is_ok());
		assert!(bus.on("DREW", |_| {}).is_ok());
	}

	#[test]
	fn delivers_in_registration_order_to_matching_kind() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let mut bus = EventBus::default();
		for tag in ["a", "b"] {
			let seen = seen.clone();
			bus.subscribe(EventKind::Zoomed, move |e| seen.borrow_mut().push((tag, e.clone())));
		}
		let other = seen.clone();
		bus.subscribe(EventKind::Drawn, move |_| {
			other.borrow_mut().push(("drawn", GraphEvent::Drawn))
		});

		bus.emit(GraphEvent::Zoomed(0.5));
		assert_eq!(
			*seen.borrow(),
			vec![("a", GraphEvent::Zoomed(0.5)), ("b", GraphEvent::Zoomed(0.5))]
		);
	}

	#[test]
	fn panicking_listener_does_not_block_later_ones() {
		let hits = Rc::new(RefCell::new(0));
		let mut bus = EventBus::default();
		bus.subscribe(EventKind::Loaded, |_| panic!("listener failure"));
		let counter = hits.clone();
		bus.subscribe(EventKind::Loaded, move |_| *counter.borrow_mut() += 1);

		bus.emit(GraphEvent::Loaded);
		bus.emit(GraphEvent::Loaded);
		assert_eq!(*hits.borrow(), 2);
	}

	#[test]
	fn off_removes_listener() {
		let hits = Rc::new(RefCell::new(0));
		let mut bus = EventBus::default();
		let counter = hits.clone();
		let id = bus.subscribe(EventKind::Drawn, move |_| *counter.borrow_mut() += 1);
		assert!(bus.off(id));
		assert!(!bus.off(id));
		bus.emit(GraphEvent::Drawn);
		assert_eq!(*hits.borrow(), 0);
	}
}
