use crate::types::{Reply, ReplyKind};

/// A node in the in-progress parse tree.
///
/// Tasks live in an arena `Vec` owned by the reader, innermost last. The
/// parent back-reference is an arena index rather than a pointer so the whole
/// tree is released by clearing the vector.
#[derive(Debug)]
pub(crate) struct ReadTask {
  /// The RESP type being parsed. The type prefix byte is consumed before the
  /// task is pushed, so this is always known.
  pub kind:     ReplyKind,
  /// Declared child count for arrays. `None` until the count line is parsed.
  ///
  /// The wire `-1` (nil array) never reaches this field since it completes
  /// the task as `Null` in the same step, keeping the "count not yet known"
  /// state distinct from the nil sentinel.
  pub elements: Option<usize>,
  /// Completed children, linked in parse order. Slot `i` is written exactly
  /// once, when the child task with `index == i` completes.
  pub slots:    Vec<Reply>,
  /// This node's position within its parent's slot list.
  pub index:    usize,
  /// Arena index of the enclosing task, or `None` at the root.
  pub parent:   Option<usize>,
}

impl ReadTask {
  pub fn new(kind: ReplyKind, index: usize, parent: Option<usize>) -> Self {
    ReadTask {
      kind,
      index,
      parent,
      elements: None,
      slots: Vec::new(),
    }
  }

  /// Whether all declared child slots are filled.
  pub fn is_filled(&self) -> bool {
    self.elements.map(|count| self.slots.len() >= count).unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn should_track_filled_slots() {
    let mut task = ReadTask::new(ReplyKind::Array, 0, None);
    assert!(!task.is_filled());

    task.elements = Some(2);
    assert!(!task.is_filled());

    task.slots.push(Reply::Integer(1));
    assert!(!task.is_filled());
    task.slots.push(Reply::Null);
    assert!(task.is_filled());
  }

  #[test]
  fn should_fill_empty_containers_immediately() {
    let mut task = ReadTask::new(ReplyKind::Array, 0, None);
    task.elements = Some(0);
    assert!(task.is_filled());
  }
}
