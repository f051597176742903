//! Pool fijo de workers de conversión.
//!
//! Cada worker es un hilo dedicado que atiende una petición de principio a
//! fin (modelo síncrono bloqueante). Las peticiones viajan por un canal
//! mpsc compartido; la respuesta vuelve por un oneshot propio de cada
//! petición. Si el frente agota el plazo, el receptor se descarta: el
//! worker termina su llamada en curso y su `send` cae en vacío, quedando
//! libre para la siguiente petición.
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::convert::toolkit::{ConversionEngine, ConvertOptions, Converted};
use crate::errors::server_error::{ConvertError, ServerError};

/// Petición que entiende un worker.
#[derive(Debug)]
pub enum WorkRequest {
    Convert {
        data: String,
        input_format: String,
        output_format: String,
        options: ConvertOptions,
    },
    Properties {
        data: String,
        input_format: String,
        add_hydrogens: bool,
    },
}

/// Respuesta de un worker.
#[derive(Debug, PartialEq)]
pub enum WorkReply {
    Converted(Converted),
    Properties(Value),
}

struct PoolJob {
    request: WorkRequest,
    reply: oneshot::Sender<Result<WorkReply, ServerError>>,
}

/// Pool de tamaño fijo sobre un `ConversionEngine`.
pub struct ConversionPool {
    tx: Mutex<Option<mpsc::Sender<PoolJob>>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ConversionPool {
    pub fn new(engine: Arc<dyn ConversionEngine>, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel::<PoolJob>();
        let rx = Arc::new(Mutex::new(rx));
        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let engine = Arc::clone(&engine);
            let handle = thread::Builder::new()
                .name(format!("convert-worker-{i}"))
                .spawn(move || worker_loop(&rx, engine.as_ref()))
                .expect("failed to spawn conversion worker");
            handles.push(handle);
        }
        Self { tx: Mutex::new(Some(tx)), workers: handles }
    }

    /// Encola una petición y espera la respuesta con el plazo dado. Un
    /// plazo vencido responde `Timeout`; el worker afectado sigue ocupado
    /// hasta acabar su llamada nativa, pero nadie espera ya por él.
    pub async fn process(
        &self,
        request: WorkRequest,
        timeout: Duration,
    ) -> Result<WorkReply, ServerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let guard = self.tx.lock().expect("pool sender lock poisoned");
            let sender = guard.as_ref().ok_or(ServerError::PoolClosed)?;
            sender
                .send(PoolJob { request, reply: reply_tx })
                .map_err(|_| ServerError::PoolClosed)?;
        }
        match tokio::time::timeout(timeout, reply_rx).await {
            Err(_) => Err(ServerError::Timeout(timeout)),
            Ok(Err(_)) => Err(ServerError::PoolClosed),
            Ok(Ok(result)) => result,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Cierra el canal y espera a que los workers drenen lo pendiente.
    pub fn shutdown(mut self) {
        self.tx.lock().expect("pool sender lock poisoned").take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(rx: &Mutex<mpsc::Receiver<PoolJob>>, engine: &dyn ConversionEngine) {
    loop {
        // El lock sólo serializa la espera; el procesado corre sin él.
        let job = {
            let guard = rx.lock().expect("pool receiver lock poisoned");
            guard.recv()
        };
        let Ok(job) = job else { break };
        // Un pánico del motor no mata al worker: la petición en curso
        // falla y el hilo queda libre para la siguiente.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            run_request(engine, &job.request)
        }));
        let result = match result {
            Ok(outcome) => outcome.map_err(ServerError::from),
            Err(_) => {
                tracing::error!(
                    worker = thread::current().name().unwrap_or("convert-worker"),
                    "conversion engine panicked"
                );
                Err(ServerError::WorkerCrashed)
            }
        };
        // Receptor desaparecido = petición caducada en el frente.
        let _ = job.reply.send(result);
    }
}

fn run_request(
    engine: &dyn ConversionEngine,
    request: &WorkRequest,
) -> Result<WorkReply, ConvertError> {
    match request {
        WorkRequest::Convert { data, input_format, output_format, options } => engine
            .convert(data, input_format, output_format, options)
            .map(WorkReply::Converted),
        WorkRequest::Properties { data, input_format, add_hydrogens } => {
            engine.properties(data, input_format, *add_hydrogens).map(WorkReply::Properties)
        }
    }
}
