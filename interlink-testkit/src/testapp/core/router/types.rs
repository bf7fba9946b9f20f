use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use interlink_core::host::types::identifiers::PortId;
use interlink_core::primitives::prelude::*;
use interlink_core::router::module::Module;
use interlink_core::router::types::module::ModuleId;

use crate::testapp::applications::account_host::{
    AccountHostModule, ACCOUNT_HOST_MODULE_ID, ACCOUNT_HOST_PORT_ID,
};
use crate::testapp::applications::dummy::{DummyModule, DUMMY_MODULE_ID, DUMMY_PORT_ID};

#[derive(Debug, Default)]
pub struct MockRouter {
    pub router: BTreeMap<ModuleId, Arc<dyn Module>>,

    /// Maps ports to the the module that owns it
    pub port_to_module: BTreeMap<PortId, ModuleId>,
}

impl MockRouter {
    /// A router with a [`DummyModule`] bound to the `dummy` port.
    pub fn new_with_dummy() -> Self {
        Self::default().with_module(DUMMY_PORT_ID, DUMMY_MODULE_ID, DummyModule::default())
    }

    /// A router with an [`AccountHostModule`] bound to the `icahost` port.
    pub fn new_with_account_host() -> Self {
        Self::default().with_module(
            ACCOUNT_HOST_PORT_ID,
            ACCOUNT_HOST_MODULE_ID,
            AccountHostModule::default(),
        )
    }

    /// Binds `module` to `port_id`, replacing any module of the same id.
    pub fn with_module(
        mut self,
        port_id: &str,
        module_id: &str,
        module: impl Module + 'static,
    ) -> Self {
        let port_id = PortId::new(port_id.to_string()).expect("Never fails");
        let module_id = ModuleId::new(module_id.to_string());

        self.scope_port_to_module(port_id, module_id.clone());
        self.router.insert(module_id, Arc::new(module));

        self
    }

    pub fn add_route(
        &mut self,
        module_id: ModuleId,
        module: impl Module + 'static,
    ) -> Result<(), String> {
        match self.router.insert(module_id, Arc::new(module)) {
            None => Ok(()),
            Some(_) => Err("Duplicate module_id".to_owned()),
        }
    }

    pub fn scope_port_to_module(&mut self, port_id: PortId, module_id: ModuleId) {
        self.port_to_module.insert(port_id, module_id);
    }
}
