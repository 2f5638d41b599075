//! Interactive workflows: search, keyword history, selection history.
//!
//! Each workflow step runs to completion before the next prompt. Store and
//! catalog failures abort the current step; in the menu loop they are
//! reported and the user lands back on the main menu.

use std::fmt;

use anyhow::Result;
use tracing::warn;

use skindex_core::{
    Catalog, CatalogError, Item, Query, RecordStore, StoreError, SEARCH_HISTORY, SELECTED_ITEMS,
};

use crate::terminal::Terminal;

const BACK: &str = "Back";
const EXIT: &str = "Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Keywords,
    Selections,
}

impl HistoryKind {
    fn collection(self) -> &'static str {
        match self {
            Self::Keywords => SEARCH_HISTORY,
            Self::Selections => SELECTED_ITEMS,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Keywords => "keyword",
            Self::Selections => "selection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Search,
    KeywordHistory,
    SelectionHistory,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 4] = [
        Self::Search,
        Self::KeywordHistory,
        Self::SelectionHistory,
        Self::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Search => "Search for items",
            Self::KeywordHistory => "View keyword history",
            Self::SelectionHistory => "View selection history",
            Self::Exit => "Exit",
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One history row: what the user sees and what picking it acts on.
struct HistoryEntry {
    label: String,
    value: String,
}

pub struct Session<'a> {
    store: &'a dyn RecordStore,
    catalog: &'a dyn Catalog,
    term: &'a mut dyn Terminal,
}

impl<'a> Session<'a> {
    pub fn new(
        store: &'a dyn RecordStore,
        catalog: &'a dyn Catalog,
        term: &'a mut dyn Terminal,
    ) -> Self {
        Self {
            store,
            catalog,
            term,
        }
    }

    /// Main menu loop. Returns when the user exits; terminal I/O errors end
    /// the loop with an error.
    pub fn run(&mut self) -> Result<()> {
        let choices: Vec<String> = MenuAction::ALL
            .iter()
            .map(|a| a.label().to_string())
            .collect();

        loop {
            let action = MenuAction::ALL[self.term.select("What would you like to do?", &choices)?];

            let outcome = match action {
                MenuAction::Search => {
                    let keyword = self.term.input("Enter a keyword to search:")?;
                    self.search(&keyword)
                }
                MenuAction::KeywordHistory => self.history(HistoryKind::Keywords),
                MenuAction::SelectionHistory => self.history(HistoryKind::Selections),
                MenuAction::Exit => {
                    self.term.say("Goodbye!")?;
                    return Ok(());
                }
            };

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) if is_recoverable(&e) => {
                    warn!("{action} failed: {e:#}");
                    self.term.say(&format!("Error: {e:#}"))?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Record the keyword, list matching items, persist and show the pick.
    pub fn search(&mut self, keyword: &str) -> Result<Flow> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.term.say("Please enter a valid keyword.")?;
            return Ok(Flow::Continue);
        }

        self.record_keyword(keyword)?;

        let results = self.catalog.search_by_keyword(keyword)?;
        if results.is_empty() {
            self.term.say("No results found.")?;
            return Ok(Flow::Continue);
        }

        let mut choices = vec![BACK.to_string()];
        choices.extend(results.iter().map(Item::label));

        let picked = self.term.select("Select an item:", &choices)?;
        if picked == 0 {
            return Ok(Flow::Continue);
        }

        let item = &results[picked - 1];
        self.record_selection(item)?;
        self.show_details(&item.id)?;
        Ok(Flow::Continue)
    }

    /// Browse one history collection. Picking a keyword searches it again,
    /// picking a selection re-fetches its details.
    pub fn history(&mut self, kind: HistoryKind) -> Result<Flow> {
        let entries = self.history_entries(kind)?;
        if entries.is_empty() {
            self.term.say("No history found.")?;
            return Ok(Flow::Continue);
        }

        let mut choices = vec![BACK.to_string(), EXIT.to_string()];
        choices.extend(entries.iter().map(|e| e.label.clone()));

        let picked = self
            .term
            .select(&format!("Select a {}:", kind.noun()), &choices)?;
        match picked {
            0 => Ok(Flow::Continue),
            1 => {
                self.term.say("Exiting...")?;
                Ok(Flow::Exit)
            }
            n => {
                let value = entries[n - 2].value.clone();
                match kind {
                    HistoryKind::Keywords => self.search(&value),
                    HistoryKind::Selections => {
                        self.show_details(&value)?;
                        Ok(Flow::Continue)
                    }
                }
            }
        }
    }

    fn history_entries(&self, kind: HistoryKind) -> Result<Vec<HistoryEntry>> {
        let collection = kind.collection();
        let records = self.store.find(collection, None)?;

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            match kind {
                HistoryKind::Keywords => match record.get_str("keyword") {
                    Some(kw) => entries.push(HistoryEntry {
                        label: kw.to_string(),
                        value: kw.to_string(),
                    }),
                    None => warn!(
                        "skipping {collection} record {} without keyword",
                        record.id().unwrap_or("?")
                    ),
                },
                HistoryKind::Selections => {
                    let item = Item::from_record(record)
                        .map_err(|e| StoreError::new(collection, format!("bad record: {e}")))?;
                    entries.push(HistoryEntry {
                        label: item.label(),
                        value: item.id,
                    });
                }
            }
        }
        Ok(entries)
    }

    fn record_keyword(&self, keyword: &str) -> Result<()> {
        let seen = self
            .store
            .find(SEARCH_HISTORY, Some(&Query::new("keyword", keyword)))?;
        if seen.is_empty() {
            let mut data = serde_json::Map::new();
            data.insert("keyword".into(), keyword.into());
            self.store.insert(SEARCH_HISTORY, data)?;
        }
        Ok(())
    }

    fn record_selection(&self, item: &Item) -> Result<()> {
        let seen = self
            .store
            .find(SELECTED_ITEMS, Some(&Query::new("id", item.id.as_str())))?;
        if seen.is_empty() {
            let data = item
                .to_data()
                .map_err(|e| StoreError::new(SELECTED_ITEMS, e))?;
            self.store.insert(SELECTED_ITEMS, data)?;
        }
        Ok(())
    }

    fn show_details(&mut self, id: &str) -> Result<()> {
        let item = self.catalog.get_details_by_id(id)?;
        if item.is_empty() {
            self.term.say(&format!("No details found for {id}."))?;
            return Ok(());
        }
        self.term.say(&format_details(&item))?;
        Ok(())
    }
}

fn format_details(item: &Item) -> String {
    let or_dash = |s: Option<String>| s.unwrap_or_else(|| "-".into());
    format!(
        "Item Details:\n  Name:        {}\n  Description: {}\n  Rarity:      {}\n  Type:        {}",
        item.name,
        or_dash(item.description.clone()),
        or_dash(item.rarity.as_ref().map(|t| t.to_string())),
        or_dash(item.kind.as_ref().map(|t| t.to_string())),
    )
}

/// Store and catalog failures abort one step; anything else (terminal I/O)
/// ends the session.
fn is_recoverable(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|c| c.is::<StoreError>() || c.is::<CatalogError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::io;

    use serde_json::json;
    use skindex_core::{CatalogResult, Tag};
    use skindex_store::JsonStore;

    #[derive(Default)]
    struct ScriptedTerminal {
        picks: VecDeque<usize>,
        inputs: VecDeque<String>,
        said: Vec<String>,
        prompts: Vec<(String, Vec<String>)>,
    }

    impl ScriptedTerminal {
        fn picks(picks: &[usize]) -> Self {
            Self {
                picks: picks.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn with_inputs(mut self, inputs: &[&str]) -> Self {
            self.inputs = inputs.iter().map(|s| s.to_string()).collect();
            self
        }

        fn output(&self) -> String {
            self.said.join("\n")
        }
    }

    impl Terminal for ScriptedTerminal {
        fn select(&mut self, message: &str, choices: &[String]) -> io::Result<usize> {
            self.prompts.push((message.to_string(), choices.to_vec()));
            self.picks
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }

        fn input(&mut self, _message: &str) -> io::Result<String> {
            self.inputs
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }

        fn say(&mut self, text: &str) -> io::Result<()> {
            self.said.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        items: Vec<Item>,
        details: HashMap<String, Item>,
        down: bool,
        searches: RefCell<Vec<String>>,
        lookups: RefCell<Vec<String>>,
    }

    impl FakeCatalog {
        fn with_items(items: Vec<Item>) -> Self {
            let details = items.iter().map(|i| (i.id.clone(), i.clone())).collect();
            Self {
                items,
                details,
                ..Self::default()
            }
        }

        fn down() -> Self {
            Self {
                down: true,
                ..Self::default()
            }
        }
    }

    impl Catalog for FakeCatalog {
        fn search_by_keyword(&self, keyword: &str) -> CatalogResult<Vec<Item>> {
            self.searches.borrow_mut().push(keyword.to_string());
            if self.down {
                return Err(CatalogError::Transport("connection refused".into()));
            }
            Ok(skindex_core::filter_by_name(self.items.clone(), keyword))
        }

        fn get_details_by_id(&self, id: &str) -> CatalogResult<Item> {
            self.lookups.borrow_mut().push(id.to_string());
            if self.down {
                return Err(CatalogError::Transport("connection refused".into()));
            }
            Ok(self.details.get(id).cloned().unwrap_or_default())
        }
    }

    fn item(id: &str, name: &str, rarity: &str) -> Item {
        Item {
            id: id.into(),
            name: name.into(),
            description: Some(format!("{name} description")),
            rarity: Some(Tag::Plain(rarity.into())),
            kind: Some(Tag::Plain("outfit".into())),
            ..Item::default()
        }
    }

    fn catalog() -> FakeCatalog {
        FakeCatalog::with_items(vec![
            item("cid_028", "Renegade Skin", "rare"),
            item("pickaxe_01", "Pickaxe", "common"),
            item("cid_029", "Raider Skin", "epic"),
        ])
    }

    fn open_store(dir: &tempfile::TempDir) -> JsonStore {
        JsonStore::open(dir.path()).unwrap()
    }

    #[test]
    fn test_search_back_persists_no_selection() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::picks(&[0]);

        let flow = Session::new(&store, &catalog, &mut term)
            .search("skin")
            .unwrap();
        assert_eq!(flow, Flow::Continue);

        assert!(store.find(SELECTED_ITEMS, None).unwrap().is_empty());
        assert!(catalog.lookups.borrow().is_empty());
        assert_eq!(store.find(SEARCH_HISTORY, None).unwrap().len(), 1);

        let (message, choices) = &term.prompts[0];
        assert_eq!(message, "Select an item:");
        assert_eq!(
            choices,
            &vec![
                "Back".to_string(),
                "Renegade Skin (rare)".to_string(),
                "Raider Skin (epic)".to_string()
            ]
        );
    }

    #[test]
    fn test_search_selection_persists_and_prints() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::picks(&[2]);

        Session::new(&store, &catalog, &mut term)
            .search("skin")
            .unwrap();

        let selected = store.find(SELECTED_ITEMS, None).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].get_str("id"), Some("cid_029"));
        assert_eq!(selected[0].get_str("name"), Some("Raider Skin"));
        assert_eq!(selected[0].get("type"), Some(&json!("outfit")));
        assert!(selected[0].id().is_some());

        assert_eq!(*catalog.lookups.borrow(), vec!["cid_029".to_string()]);
        let out = term.output();
        assert!(out.contains("Name:        Raider Skin"));
        assert!(out.contains("Rarity:      epic"));
        assert!(out.contains("Description: Raider Skin description"));
    }

    #[test]
    fn test_search_blank_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::default();

        Session::new(&store, &catalog, &mut term)
            .search("   ")
            .unwrap();

        assert_eq!(term.output(), "Please enter a valid keyword.");
        assert!(term.prompts.is_empty());
        assert!(catalog.searches.borrow().is_empty());
        assert!(store.find(SEARCH_HISTORY, None).unwrap().is_empty());
    }

    #[test]
    fn test_search_no_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::default();

        Session::new(&store, &catalog, &mut term)
            .search("glider")
            .unwrap();

        assert_eq!(term.output(), "No results found.");
        assert!(term.prompts.is_empty());
        let history = store.find(SEARCH_HISTORY, None).unwrap();
        assert_eq!(history[0].get_str("keyword"), Some("glider"));
    }

    #[test]
    fn test_keyword_and_selection_recorded_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::picks(&[1, 1]);

        let mut session = Session::new(&store, &catalog, &mut term);
        session.search("skin").unwrap();
        session.search(" skin ").unwrap();

        assert_eq!(store.find(SEARCH_HISTORY, None).unwrap().len(), 1);
        assert_eq!(store.find(SELECTED_ITEMS, None).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_history_opens_no_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();

        for kind in [HistoryKind::Keywords, HistoryKind::Selections] {
            let mut term = ScriptedTerminal::default();
            let flow = Session::new(&store, &catalog, &mut term)
                .history(kind)
                .unwrap();
            assert_eq!(flow, Flow::Continue);
            assert_eq!(term.output(), "No history found.");
            assert!(term.prompts.is_empty());
        }
    }

    #[test]
    fn test_keyword_history_reruns_search() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut seed = ScriptedTerminal::default();
        Session::new(&store, &catalog, &mut seed)
            .search("glider")
            .unwrap();
        let mut seed = ScriptedTerminal::picks(&[0]);
        Session::new(&store, &catalog, &mut seed)
            .search("pick")
            .unwrap();

        // Back, Exit, glider, pick -> "pick", then Back at the item list.
        let mut term = ScriptedTerminal::picks(&[3, 0]);
        let flow = Session::new(&store, &catalog, &mut term)
            .history(HistoryKind::Keywords)
            .unwrap();
        assert_eq!(flow, Flow::Continue);

        let (message, choices) = &term.prompts[0];
        assert_eq!(message, "Select a keyword:");
        assert_eq!(choices, &vec!["Back", "Exit", "glider", "pick"]);
        assert_eq!(catalog.searches.borrow().last().unwrap(), "pick");
        assert_eq!(term.prompts[1].1, vec!["Back", "Pickaxe (common)"]);
    }

    #[test]
    fn test_selection_history_refetches_details() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut seed = ScriptedTerminal::picks(&[1]);
        Session::new(&store, &catalog, &mut seed)
            .search("renegade")
            .unwrap();

        let mut term = ScriptedTerminal::picks(&[2]);
        Session::new(&store, &catalog, &mut term)
            .history(HistoryKind::Selections)
            .unwrap();

        assert_eq!(term.prompts[0].0, "Select a selection:");
        assert_eq!(term.prompts[0].1[2], "Renegade Skin (rare)");
        assert_eq!(
            *catalog.lookups.borrow(),
            vec!["cid_028".to_string(), "cid_028".to_string()]
        );
        assert!(term.output().contains("Name:        Renegade Skin"));
    }

    #[test]
    fn test_history_back_and_exit() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut seed = ScriptedTerminal::default();
        Session::new(&store, &catalog, &mut seed)
            .search("glider")
            .unwrap();

        let mut term = ScriptedTerminal::picks(&[0, 1]);
        let mut session = Session::new(&store, &catalog, &mut term);
        assert_eq!(
            session.history(HistoryKind::Keywords).unwrap(),
            Flow::Continue
        );
        assert_eq!(session.history(HistoryKind::Keywords).unwrap(), Flow::Exit);
        assert_eq!(term.output(), "Exiting...");
    }

    #[test]
    fn test_missing_details() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let mut catalog = catalog();
        catalog.details.clear();
        let mut term = ScriptedTerminal::picks(&[1]);

        Session::new(&store, &catalog, &mut term)
            .search("renegade")
            .unwrap();
        assert_eq!(term.output(), "No details found for cid_028.");
    }

    #[test]
    fn test_run_exit() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::picks(&[3]);

        Session::new(&store, &catalog, &mut term).run().unwrap();
        assert_eq!(term.output(), "Goodbye!");
        assert_eq!(
            term.prompts[0].1,
            vec![
                "Search for items",
                "View keyword history",
                "View selection history",
                "Exit"
            ]
        );
    }

    #[test]
    fn test_run_recovers_from_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = FakeCatalog::down();
        let mut term = ScriptedTerminal::picks(&[0, 3]).with_inputs(&["skin"]);

        Session::new(&store, &catalog, &mut term).run().unwrap();
        let out = term.output();
        assert!(out.contains("Error: transport error: connection refused"));
        assert!(out.ends_with("Goodbye!"));
        assert_eq!(term.prompts.len(), 2);
    }

    #[test]
    fn test_run_recovers_from_store_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("search_history.json"), "{broken").unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::picks(&[1, 3]);

        Session::new(&store, &catalog, &mut term).run().unwrap();
        let out = term.output();
        assert!(out.contains("Error: collection search_history"));
        assert!(out.ends_with("Goodbye!"));
    }

    #[test]
    fn test_run_history_exit_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut seed = ScriptedTerminal::default();
        Session::new(&store, &catalog, &mut seed)
            .search("glider")
            .unwrap();

        let mut term = ScriptedTerminal::picks(&[1, 1]);
        Session::new(&store, &catalog, &mut term).run().unwrap();
        assert_eq!(term.output(), "Exiting...");
    }

    #[test]
    fn test_run_closed_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let catalog = catalog();
        let mut term = ScriptedTerminal::default();

        let err = Session::new(&store, &catalog, &mut term).run().unwrap_err();
        assert!(!is_recoverable(&err));
    }
}
