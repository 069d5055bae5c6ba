use serde::{Deserialize, Serialize};

/// Expression loaded into the editor on startup.
pub(crate) const INITIAL_EXPRESSION: &str =
  r"x=\frac{-b\pm\sqrt{b^2-4ac}}{2a}\text{ formülünün sonucu \underline{tam say\i} değeri olarak nedir?}";

/// One loadable example: either a shipped default or a snippet the user
/// saved this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExampleSnippet {
  pub(crate) id: String,
  pub(crate) name: String,
  pub(crate) latex: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub(crate) timestamp_ms: Option<u64>,
}

fn default_example(id: &str, name: &str, latex: &str) -> ExampleSnippet {
  ExampleSnippet {
    id: id.to_string(),
    name: name.to_string(),
    latex: latex.to_string(),
    timestamp_ms: None,
  }
}

pub(crate) fn default_examples() -> Vec<ExampleSnippet> {
  vec![
    default_example(
      "default-1",
      "Your Formula",
      r"\sum_{n=1}^{\infty}\frac{1}{n^2}=\frac{\pi^2}{6}\text{ değerinin 3 e bölümünden kalan son değeri \underline{tam olarak nedir?}}",
    ),
    default_example("default-2", "Quadratic Formula", INITIAL_EXPRESSION),
    default_example(
      "default-3",
      "Integral",
      r"\int_0^{\infty}e^{-x}dx=1\text{'e eşit ise bu formülün sonucunda birden den farkl\i kaç senaryo olabilir.}",
    ),
    default_example(
      "default-4",
      "Sum",
      r"\sum_{n=1}^{\infty} \frac{1}{n^2} = \frac{\pi^2}{6}",
    ),
    default_example(
      "default-5",
      "Matrix",
      r"\begin{pmatrix} a & b \\ c & d \end{pmatrix}",
    ),
  ]
}

/// Session-scoped snippet collection. Saved snippets live only in memory;
/// the list resets to the shipped defaults on every launch.
#[derive(Debug)]
pub(crate) struct SnippetStore {
  saved: Vec<ExampleSnippet>,
  defaults: Vec<ExampleSnippet>,
  next_id: u64,
}

impl SnippetStore {
  pub(crate) fn new() -> Self {
    Self {
      saved: Vec::new(),
      defaults: default_examples(),
      next_id: 1,
    }
  }

  /// Saves the current expression under a label. Ids come from a session
  /// counter, so two saves in the same millisecond cannot collide.
  pub(crate) fn save(
    &mut self,
    name: &str,
    latex: &str,
    timestamp_ms: u64,
  ) -> Result<ExampleSnippet, String> {
    let name = name.trim();
    if name.is_empty() {
      return Err("Please enter a label for your formula.".to_string());
    }
    if latex.trim().is_empty() {
      return Err("Please enter a LaTeX expression first.".to_string());
    }

    let snippet = ExampleSnippet {
      id: format!("saved-{}", self.next_id),
      name: name.to_string(),
      latex: latex.to_string(),
      timestamp_ms: Some(timestamp_ms),
    };
    self.next_id += 1;
    self.saved.push(snippet.clone());
    Ok(snippet)
  }

  /// Removes a saved snippet by id, preserving the order of the rest.
  /// Defaults are not deletable; unknown ids are a no-op.
  pub(crate) fn delete(&mut self, id: &str) -> bool {
    let before = self.saved.len();
    self.saved.retain(|snippet| snippet.id != id);
    self.saved.len() != before
  }

  /// Saved snippets first, then the shipped defaults.
  pub(crate) fn all(&self) -> Vec<ExampleSnippet> {
    let mut all = self.saved.clone();
    all.extend(self.defaults.iter().cloned());
    all
  }

  pub(crate) fn find(&self, id: &str) -> Option<&ExampleSnippet> {
    self
      .saved
      .iter()
      .chain(self.defaults.iter())
      .find(|snippet| snippet.id == id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_listed_after_saved() {
    let mut store = SnippetStore::new();
    store.save("Mine", "x^2", 1).unwrap();

    let all = store.all();
    assert_eq!(all.len(), 6);
    assert_eq!(all[0].name, "Mine");
    assert_eq!(all[1].id, "default-1");
  }

  #[test]
  fn saved_ids_are_unique_within_a_session() {
    let mut store = SnippetStore::new();
    let a = store.save("a", "x", 42).unwrap();
    let b = store.save("b", "y", 42).unwrap();
    assert_eq!(a.id, "saved-1");
    assert_eq!(b.id, "saved-2");
    assert_ne!(a.id, b.id);
  }

  #[test]
  fn save_requires_label_and_expression() {
    let mut store = SnippetStore::new();
    assert!(store.save("  ", "x^2", 0).is_err());
    assert!(store.save("label", "  ", 0).is_err());
    assert!(store.all().iter().all(|s| !s.id.starts_with("saved-")));
  }

  #[test]
  fn delete_removes_exactly_one_entry_preserving_order() {
    let mut store = SnippetStore::new();
    store.save("a", "x", 0).unwrap();
    store.save("b", "y", 0).unwrap();
    store.save("c", "z", 0).unwrap();

    assert!(store.delete("saved-2"));

    let all = store.all();
    assert_eq!(all[0].id, "saved-1");
    assert_eq!(all[1].id, "saved-3");
    assert_eq!(all[2].id, "default-1");
    assert_eq!(all.len(), 7);
  }

  #[test]
  fn delete_ignores_unknown_and_default_ids() {
    let mut store = SnippetStore::new();
    assert!(!store.delete("saved-123"));
    assert!(!store.delete("default-1"));
    assert_eq!(store.all().len(), 5);
  }

  #[test]
  fn find_resolves_both_lists() {
    let mut store = SnippetStore::new();
    let saved = store.save("Mine", "x^2", 0).unwrap();
    assert_eq!(store.find(&saved.id).unwrap().latex, "x^2");
    assert!(store.find("default-5").is_some());
    assert!(store.find("missing").is_none());
  }

  #[test]
  fn saved_snippets_carry_a_timestamp() {
    let mut store = SnippetStore::new();
    let snippet = store.save("Mine", "x^2", 1234).unwrap();
    assert_eq!(snippet.timestamp_ms, Some(1234));
    assert!(store.find("default-1").unwrap().timestamp_ms.is_none());
  }
}
