//! Implementación simulada de `TwoWire` a nivel de transacción
//!
//! Registra cada primitiva que el driver pide al bus, sin modelar las líneas.
//! Sirve para comprobar secuencias exactas y la ausencia de reintentos.

use qmc5883l_rs::{BusError, ReadCount, TwoWire};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

/// Primitivas registradas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Begin(u8, ReadCount),
    Restart(u8, ReadCount),
    Write(u8),
    Read(u8),
    End,
}

#[derive(Debug, Default)]
struct MockState {
    operations: Vec<Operation>,
    read_data: VecDeque<u8>,
    nack_address: bool,
    nack_data: bool,
}

/// Bus simulado; los clones comparten estado
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Rc<RefCell<MockState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes que devolverán las próximas lecturas
    pub fn queue_read(&self, bytes: &[u8]) {
        self.state.borrow_mut().read_data.extend(bytes.iter().copied());
    }

    pub fn set_nack_address(&self, nack: bool) {
        self.state.borrow_mut().nack_address = nack;
    }

    pub fn set_nack_data(&self, nack: bool) {
        self.state.borrow_mut().nack_data = nack;
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }

    /// Número de transacciones abiertas (sin contar starts repetidos)
    pub fn transaction_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, Operation::Begin(..)))
            .count()
    }

    fn open(&self, operation: Operation) -> Result<(), BusError<Infallible>> {
        let mut state = self.state.borrow_mut();
        state.operations.push(operation);
        if state.nack_address {
            Err(BusError::AddressNack)
        } else {
            Ok(())
        }
    }
}

impl TwoWire for MockBus {
    type LineError = Infallible;

    fn begin_transaction(
        &mut self,
        address: u8,
        count: ReadCount,
    ) -> Result<(), BusError<Infallible>> {
        self.open(Operation::Begin(address, count))
    }

    fn restart_transaction(
        &mut self,
        address: u8,
        count: ReadCount,
    ) -> Result<(), BusError<Infallible>> {
        self.open(Operation::Restart(address, count))
    }

    fn write_byte(&mut self, value: u8) -> Result<(), BusError<Infallible>> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::Write(value));
        if state.nack_data {
            Err(BusError::DataNack)
        } else {
            Ok(())
        }
    }

    fn read_byte(&mut self) -> Result<u8, BusError<Infallible>> {
        let mut state = self.state.borrow_mut();
        let value = state.read_data.pop_front().unwrap_or(0);
        state.operations.push(Operation::Read(value));
        Ok(value)
    }

    fn end_transaction(&mut self) -> Result<(), BusError<Infallible>> {
        self.state.borrow_mut().operations.push(Operation::End);
        Ok(())
    }
}
