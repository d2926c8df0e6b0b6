//! Tool and action registry
//!
//! Each tool declares its actions as a plain enum implementing [`ToolAction`]
//! and dispatches on it with an exhaustive `match` inside [`Tool::execute`].
//! Registration walks `ToolAction::ALL`, asks the tool for each action's
//! descriptor, checks it, and stores a type-erased handler keyed by
//! `(tool, action)`. Lookups are case-insensitive.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::batch::BatchItem;
use crate::descriptor::ActionDescriptor;
use crate::error::{Error, ErrorCode, OperationError, Result};
use crate::params::ResolvedParameters;
use crate::session::{OperationResult, Session};

/// The closed set of actions a tool understands
pub trait ToolAction: Copy + Send + Sync + 'static {
    /// Every action, in the order they are listed for discovery
    const ALL: &'static [Self];

    /// Wire name of the action
    fn name(self) -> &'static str;

    /// Look up an action by wire name (case-insensitive)
    fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }
}

/// A `manage_X` tool: one entry point, many actions
pub trait Tool<S: Session>: Send + Sync + 'static {
    type Action: ToolAction;

    /// Wire name of the tool
    fn name(&self) -> &'static str;

    /// One-line description shown in discovery
    fn description(&self) -> &'static str {
        ""
    }

    /// Contract of one action
    fn describe(&self, action: Self::Action) -> ActionDescriptor;

    /// Run a validated action against the session
    fn execute(
        &self,
        action: Self::Action,
        session: &mut S,
        params: &ResolvedParameters,
    ) -> OperationResult;

    /// Check the preconditions a batch action shares across all its items
    ///
    /// Runs before any item. An error fails the whole call with its own
    /// code instead of being repeated once per item.
    fn prepare_batch(
        &self,
        action: Self::Action,
        session: &S,
        params: &ResolvedParameters,
    ) -> std::result::Result<(), OperationError> {
        let _ = (action, session, params);
        Ok(())
    }

    /// Run one item of a batch action
    fn execute_item(
        &self,
        action: Self::Action,
        session: &mut S,
        params: &ResolvedParameters,
        item: &BatchItem,
    ) -> OperationResult {
        let _ = (session, params, item);
        Err(OperationError::new(
            ErrorCode::OperationFailed,
            format!("'{}' cannot run per item", action.name()),
        ))
    }
}

type Handler<S> = Arc<dyn Fn(&mut S, &ResolvedParameters) -> OperationResult + Send + Sync>;
type PrepareHandler<S> = Arc<
    dyn Fn(&S, &ResolvedParameters) -> std::result::Result<(), OperationError> + Send + Sync,
>;
type ItemHandler<S> =
    Arc<dyn Fn(&mut S, &ResolvedParameters, &BatchItem) -> OperationResult + Send + Sync>;

/// A registered action: its descriptor plus handlers bound to the tool
pub struct RegisteredAction<S> {
    pub descriptor: ActionDescriptor,
    handler: Handler<S>,
    prepare_handler: PrepareHandler<S>,
    item_handler: ItemHandler<S>,
}

impl<S> RegisteredAction<S> {
    pub fn execute(&self, session: &mut S, params: &ResolvedParameters) -> OperationResult {
        (self.handler)(session, params)
    }

    pub fn prepare_batch(
        &self,
        session: &S,
        params: &ResolvedParameters,
    ) -> std::result::Result<(), OperationError> {
        (self.prepare_handler)(session, params)
    }

    pub fn execute_item(
        &self,
        session: &mut S,
        params: &ResolvedParameters,
        item: &BatchItem,
    ) -> OperationResult {
        (self.item_handler)(session, params, item)
    }
}

/// A registered tool with its actions in declaration order
pub struct RegisteredTool<S> {
    pub name: &'static str,
    pub description: &'static str,
    pub actions: Vec<RegisteredAction<S>>,
}

impl<S> RegisteredTool<S> {
    pub fn action(&self, name: &str) -> Option<&RegisteredAction<S>> {
        self.actions
            .iter()
            .find(|a| a.descriptor.action.eq_ignore_ascii_case(name))
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions
            .iter()
            .map(|a| a.descriptor.action.as_str())
            .collect()
    }
}

/// All tools known to a dispatcher
pub struct ActionRegistry<S> {
    tools: BTreeMap<String, RegisteredTool<S>>,
}

impl<S> Default for ActionRegistry<S> {
    fn default() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }
}

impl<S: Session + 'static> ActionRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool and every action it declares
    pub fn register<T: Tool<S>>(&mut self, tool: T) -> Result<()> {
        let key = tool.name().to_ascii_lowercase();
        if self.tools.contains_key(&key) {
            return Err(Error::DuplicateTool(tool.name().to_string()));
        }

        let tool = Arc::new(tool);
        let mut actions: Vec<RegisteredAction<S>> = Vec::with_capacity(T::Action::ALL.len());

        for &action in T::Action::ALL {
            let mut descriptor = tool.describe(action);
            descriptor.tool = tool.name().to_string();
            descriptor.action = action.name().to_string();
            descriptor.check()?;

            if actions
                .iter()
                .any(|a| a.descriptor.action.eq_ignore_ascii_case(action.name()))
            {
                return Err(Error::DuplicateAction {
                    tool: tool.name().to_string(),
                    action: action.name().to_string(),
                });
            }

            let run = Arc::clone(&tool);
            let prepare = Arc::clone(&tool);
            let run_item = Arc::clone(&tool);
            actions.push(RegisteredAction {
                descriptor,
                handler: Arc::new(move |session: &mut S, params: &ResolvedParameters| {
                    run.execute(action, session, params)
                }),
                prepare_handler: Arc::new(move |session: &S, params: &ResolvedParameters| {
                    prepare.prepare_batch(action, session, params)
                }),
                item_handler: Arc::new(
                    move |session: &mut S, params: &ResolvedParameters, item: &BatchItem| {
                        run_item.execute_item(action, session, params, item)
                    },
                ),
            });
        }

        tracing::debug!(tool = tool.name(), actions = actions.len(), "Registered tool");
        self.tools.insert(
            key,
            RegisteredTool {
                name: tool.name(),
                description: tool.description(),
                actions,
            },
        );
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<T: Tool<S>>(mut self, tool: T) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }
}

impl<S> ActionRegistry<S> {
    pub fn tool(&self, name: &str) -> Option<&RegisteredTool<S>> {
        self.tools.get(&name.to_ascii_lowercase())
    }

    pub fn tools(&self) -> impl Iterator<Item = &RegisteredTool<S>> {
        self.tools.values()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.values().map(|t| t.name).collect()
    }

    /// Descriptors of every action of `tool`, in declaration order
    pub fn actions(&self, tool: &str) -> Option<Vec<&ActionDescriptor>> {
        self.tool(tool)
            .map(|t| t.actions.iter().map(|a| &a.descriptor).collect())
    }

    pub fn descriptor(&self, tool: &str, action: &str) -> Option<&ActionDescriptor> {
        self.tool(tool)
            .and_then(|t| t.action(action))
            .map(|a| &a.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use serde_json::Map;

    struct Nothing;

    impl Session for Nothing {
        fn begin_transaction(&mut self, _label: &str) {}
        fn commit(&mut self) {}
        fn rollback(&mut self) {}
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum EchoAction {
        Ping,
        Echo,
    }

    impl ToolAction for EchoAction {
        const ALL: &'static [Self] = &[Self::Ping, Self::Echo];

        fn name(self) -> &'static str {
            match self {
                Self::Ping => "ping",
                Self::Echo => "echo",
            }
        }
    }

    struct EchoTool;

    impl Tool<Nothing> for EchoTool {
        type Action = EchoAction;

        fn name(&self) -> &'static str {
            "manage_echo"
        }

        fn describe(&self, action: EchoAction) -> ActionDescriptor {
            let descriptor = ActionDescriptor::new(self.name(), action.name());
            match action {
                EchoAction::Ping => descriptor,
                EchoAction::Echo => descriptor.field(FieldSpec::string("text").required()),
            }
        }

        fn execute(
            &self,
            action: EchoAction,
            _session: &mut Nothing,
            params: &ResolvedParameters,
        ) -> OperationResult {
            let mut out = Map::new();
            match action {
                EchoAction::Ping => {
                    out.insert("pong".to_string(), true.into());
                }
                EchoAction::Echo => {
                    out.insert("text".to_string(), params.require_str("text")?.into());
                }
            }
            Ok(out)
        }
    }

    struct BrokenTool;

    impl Tool<Nothing> for BrokenTool {
        type Action = EchoAction;

        fn name(&self) -> &'static str {
            "manage_broken"
        }

        fn describe(&self, action: EchoAction) -> ActionDescriptor {
            ActionDescriptor::new(self.name(), action.name())
                .field(FieldSpec::string("a").alias("b"))
                .field(FieldSpec::string("B"))
        }

        fn execute(&self, _: EchoAction, _: &mut Nothing, _: &ResolvedParameters) -> OperationResult {
            Ok(Map::new())
        }
    }

    #[test]
    fn test_action_parse_is_case_insensitive() {
        assert_eq!(EchoAction::parse("PING"), Some(EchoAction::Ping));
        assert_eq!(EchoAction::parse("missing"), None);
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ActionRegistry::new().with(EchoTool);
        let Ok(registry) = registry else {
            panic!("registration failed");
        };

        assert_eq!(registry.tool_names(), vec!["manage_echo"]);
        let tool = registry.tool("MANAGE_ECHO");
        assert_eq!(tool.map(RegisteredTool::action_names), Some(vec!["ping", "echo"]));
        assert!(registry.descriptor("manage_echo", "Echo").is_some());
        assert!(registry.descriptor("manage_echo", "shout").is_none());

        let actions = registry.actions("manage_echo").unwrap_or_default();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].fields.len(), 1);
        assert!(registry.actions("manage_nothing").is_none());
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let mut registry = ActionRegistry::new();
        assert!(registry.register(EchoTool).is_ok());
        assert_eq!(
            registry.register(EchoTool).err(),
            Some(Error::DuplicateTool("manage_echo".to_string()))
        );
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let mut registry = ActionRegistry::new();
        assert!(matches!(
            registry.register(BrokenTool),
            Err(Error::DuplicateAlias { .. })
        ));
    }

    #[test]
    fn test_handler_bound_to_action() {
        let mut registry = ActionRegistry::new();
        assert!(registry.register(EchoTool).is_ok());
        let action = registry.tool("manage_echo").and_then(|t| t.action("ping"));
        let output = action.map(|a| a.execute(&mut Nothing, &ResolvedParameters::new()));
        assert_eq!(
            output.and_then(|result| result.ok()).and_then(|o| o.get("pong").cloned()),
            Some(serde_json::Value::Bool(true))
        );
    }
}
