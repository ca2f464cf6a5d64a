use super::method::{MethodIntrospector, MethodTarget};
use crate::docstring;
use crate::error::{Error, Result};
use crate::handler::{ActionMap, Callback, Handler, HandlerKind};
use crate::marker_block::MarkerBlock;
use crate::operation::Operation;
use crate::route_tree::Endpoint;
use log::debug;

/// Enumerates the documented methods of one handler.
pub struct ViewIntrospector<'a> {
    callback: &'a Callback,
    handler: &'a dyn Handler,
    path: &'a str,
    hide_hidden_methods: bool,
}

impl<'a> ViewIntrospector<'a> {
    /// Introspector over every method of the callback's handler. Returns `None` for
    /// callbacks that wrap no handler.
    pub fn new(callback: &'a Callback, path: &'a str) -> Option<Self> {
        let handler = callback.handler()?;
        Some(Self {
            callback,
            handler: handler.as_ref(),
            path,
            hide_hidden_methods: false,
        })
    }

    /// Introspector used for documentation collection: methods whose structured block
    /// sets `hidden_method` are skipped.
    pub fn for_endpoint(endpoint: &'a Endpoint) -> Self {
        Self {
            callback: &endpoint.callback,
            handler: endpoint.handler.as_ref(),
            path: &endpoint.path,
            hide_hidden_methods: true,
        }
    }

    pub fn hiding_hidden_methods(mut self, hide: bool) -> Self {
        self.hide_hidden_methods = hide;
        self
    }

    pub fn handler(&self) -> &'a dyn Handler {
        self.handler
    }

    pub fn kind(&self) -> HandlerKind {
        self.handler.kind()
    }

    /// First sentence of the first line of the handler's class docstring
    pub fn description(&self) -> String {
        docstring::short_description(self.handler.docstring())
    }

    /// Structured block of the class docstring
    pub fn marker_block(&self) -> MarkerBlock {
        MarkerBlock::parse(self.handler.docstring())
    }

    /// Lazily enumerate method introspectors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedHandler`] for a dispatch handler whose callback does
    /// not expose an action map.
    pub fn methods(&self) -> Result<Box<dyn Iterator<Item = MethodIntrospector<'a>> + 'a>> {
        let handler = self.handler;
        let path = self.path;

        let targets: Box<dyn Iterator<Item = MethodTarget> + 'a> = match handler.kind() {
            HandlerKind::Simple => Box::new(
                handler
                    .allowed_methods()
                    .into_iter()
                    .map(MethodTarget::Simple),
            ),
            HandlerKind::Dispatch => {
                let actions = self.action_map()?;
                Box::new(actions.iter().map(|(http_method, action)| MethodTarget::Dispatch {
                    http_method: *http_method,
                    action: action.clone(),
                }))
            }
        };

        let hide = self.hide_hidden_methods;
        Ok(Box::new(
            targets
                .map(move |target| MethodIntrospector::new(handler, path, target))
                .filter(move |method| {
                    if hide && method.marker_block().is_hidden_method() {
                        debug!(
                            "Hiding {} {} of {}",
                            method.http_method(),
                            path,
                            handler.name()
                        );
                        return false;
                    }
                    true
                }),
        ))
    }

    /// Lazily build one operation per visible method
    pub fn operations(&self) -> Result<impl Iterator<Item = Operation> + 'a> {
        Ok(self.methods()?.map(|method| method.build()))
    }

    fn action_map(&self) -> Result<&'a ActionMap> {
        self.callback
            .action_map()
            .ok_or_else(|| Error::UnsupportedHandler {
                handler: self.handler.name().to_string(),
                path: self.path.to_string(),
            })
    }
}
