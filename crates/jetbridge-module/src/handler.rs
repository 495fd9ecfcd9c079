//! Request handlers run by the module for each uplink packet.

use jetbridge_protocol::{Opcode, Packet};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Produces the response for one command packet.
///
/// Returning `None` sends nothing; the client's request then times out.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &Packet) -> Option<Packet>;
}

impl<F> RequestHandler for F
where
    F: Fn(&Packet) -> Option<Packet> + Send + Sync,
{
    fn handle(&self, request: &Packet) -> Option<Packet> {
        self(request)
    }
}

/// Calculator engine behind the binary opcodes.
pub trait CalculatorBackend: Send + Sync {
    /// Run calculator code for its side effects.
    fn execute(&self, code: &str);

    /// Current value of a named variable, if it exists.
    fn read_variable(&self, name: &str) -> Option<f64>;
}

/// Dispatches binary commands by opcode.
pub struct OpcodeHandler<B> {
    backend: B,
}

impl<B: CalculatorBackend> OpcodeHandler<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: CalculatorBackend> RequestHandler for OpcodeHandler<B> {
    fn handle(&self, request: &Packet) -> Option<Packet> {
        let id = request.id();
        match request.opcode() {
            Some(Opcode::ExecuteCalculatorCode) => {
                let code = request.argument();
                trace!(id = %id, code = %code, "Executing calculator code");
                self.backend.execute(&code);
                Some(Packet::empty(id))
            }
            Some(Opcode::GetNamedVariable) => {
                let name = request.argument();
                let value = self.backend.read_variable(&name);
                if value.is_none() {
                    debug!(id = %id, name = %name, "Unknown variable, not answering");
                }
                value.map(|v| Packet::with_f64(id, v))
            }
            None => {
                debug!(id = %id, opcode = request.data()[0], "Unknown opcode dropped");
                None
            }
        }
    }
}

/// In-memory backend: a variable map plus a log of executed code.
#[derive(Default)]
pub struct MemoryBackend {
    variables: RwLock<HashMap<String, f64>>,
    executed: RwLock<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable(&self, name: &str, value: f64) {
        self.variables.write().insert(name.to_string(), value);
    }

    /// Code strings executed so far, oldest first.
    pub fn executed(&self) -> Vec<String> {
        self.executed.read().clone()
    }
}

impl CalculatorBackend for MemoryBackend {
    fn execute(&self, code: &str) {
        self.executed.write().push(code.to_string());
    }

    fn read_variable(&self, name: &str) -> Option<f64> {
        self.variables.read().get(name).copied()
    }
}

impl<B: CalculatorBackend> CalculatorBackend for std::sync::Arc<B> {
    fn execute(&self, code: &str) {
        (**self).execute(code);
    }

    fn read_variable(&self, name: &str) -> Option<f64> {
        (**self).read_variable(name)
    }
}
