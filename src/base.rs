//! Funcionalidades y traits base para las esperas del sensor

use core::sync::atomic::{AtomicBool, Ordering};

/// Política de espera del bit de datos listos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollPolicy {
    /// Consulta indefinidamente; un sensor desconectado bloquea al llamador
    #[default]
    Forever,
    /// Consulta como máximo este número de veces y después devuelve `Timeout`
    MaxPolls(u32),
}

impl PollPolicy {
    /// Indica si ya se agotó el presupuesto tras `polls` consultas
    pub fn exhausted(&self, polls: u32) -> bool {
        match self {
            PollPolicy::Forever => false,
            PollPolicy::MaxPolls(max) => polls >= *max,
        }
    }
}

/// Trait para cancelar una espera bloqueante desde fuera.
/// Se consulta antes de cada lectura del registro de estado.
pub trait CancelToken {
    /// Retorna true si la espera debe abandonarse
    fn is_cancelled(&self) -> bool;
}

/// Token que nunca cancela
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancelación mediante un flag atómico, p. ej. activado desde una interrupción
impl CancelToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Cancelación mediante un closure
pub struct FnCancel<F>(pub F);

impl<F> CancelToken for FnCancel<F>
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        (self.0)()
    }
}

impl<T: CancelToken + ?Sized> CancelToken for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(feature = "std")]
impl<T: CancelToken + ?Sized> CancelToken for std::sync::Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
