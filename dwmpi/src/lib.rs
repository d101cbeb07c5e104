//! Rank-level communication behind a small trait.
//!
//! `SerialComm` is the one-rank world. `ThreadComm` runs N ranks as threads
//! of one process and is what the distributed tests use. With the `mpi`
//! feature, `MpiComm` spans the processes of an MPI job.

#[cfg(feature = "mpi")]
mod mpi;

#[cfg(feature = "mpi")]
pub use mpi::MpiComm;

use std::fmt;
use std::sync::{Arc, Barrier, Mutex};
use types::*;

pub const MPI_ROOT: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommError {
    InvalidRoot { root: usize, size: usize },
    LengthMismatch { expected: usize, got: usize },
    /// more bytes than one MPI call can carry
    TooLarge { len: usize },
    Poisoned,
    Mpi { call: &'static str, code: i32 },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommError::InvalidRoot { root, size } => {
                write!(f, "broadcast root {} is not a rank of a world of size {}", root, size)
            }
            CommError::LengthMismatch { expected, got } => {
                write!(f, "broadcast delivered {} bytes, expected {}", got, expected)
            }
            CommError::TooLarge { len } => {
                write!(f, "broadcast of {} bytes exceeds the MPI count limit", len)
            }
            CommError::Poisoned => write!(f, "a rank panicked during communication"),
            CommError::Mpi { call, code } => write!(f, "{} returned error code {}", call, code),
        }
    }
}

impl std::error::Error for CommError {}

pub trait Comm {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn barrier(&self) -> Result<(), CommError>;

    /// On return every rank holds the root's bytes.
    fn bcast_bytes(&self, buf: &mut Vec<u8>, root: usize) -> Result<(), CommError>;

    fn is_root(&self) -> bool {
        self.rank() == MPI_ROOT
    }
}

/// Fixed-size values that can travel through `bcast_bytes`.
pub trait CommData: Copy + Default {
    const NBYTES: usize;

    fn put(&self, out: &mut Vec<u8>);

    fn get(bytes: &[u8]) -> Self;
}

macro_rules! impl_comm_data {
    ($t:ty) => {
        impl CommData for $t {
            const NBYTES: usize = std::mem::size_of::<$t>();

            fn put(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn get(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..Self::NBYTES]);
                <$t>::from_le_bytes(raw)
            }
        }
    };
}

impl_comm_data!(f64);
impl_comm_data!(i32);
impl_comm_data!(u64);
impl_comm_data!(u8);

impl CommData for usize {
    const NBYTES: usize = 8;

    fn put(&self, out: &mut Vec<u8>) {
        (*self as u64).put(out);
    }

    fn get(bytes: &[u8]) -> Self {
        u64::get(bytes) as usize
    }
}

impl CommData for c64 {
    const NBYTES: usize = 16;

    fn put(&self, out: &mut Vec<u8>) {
        self.re.put(out);
        self.im.put(out);
    }

    fn get(bytes: &[u8]) -> Self {
        c64::new(f64::get(&bytes[0..8]), f64::get(&bytes[8..16]))
    }
}

pub fn encode_slice<T: CommData>(v: &[T], out: &mut Vec<u8>) {
    out.reserve(v.len() * T::NBYTES);

    for x in v.iter() {
        x.put(out);
    }
}

pub fn decode_slice<T: CommData>(bytes: &[u8], v: &mut [T]) -> Result<(), CommError> {
    let expected = v.len() * T::NBYTES;

    if bytes.len() != expected {
        return Err(CommError::LengthMismatch {
            expected,
            got: bytes.len(),
        });
    }

    for (x, chunk) in v.iter_mut().zip(bytes.chunks_exact(T::NBYTES)) {
        *x = T::get(chunk);
    }

    Ok(())
}

/// Every rank must pass a slice of the same length.
pub fn bcast_slice<T: CommData, C: Comm + ?Sized>(
    comm: &C,
    buf: &mut [T],
    root: usize,
) -> Result<(), CommError> {
    let mut bytes = Vec::new();

    if comm.rank() == root {
        encode_slice(buf, &mut bytes);
    }

    comm.bcast_bytes(&mut bytes, root)?;

    if comm.rank() != root {
        decode_slice(&bytes, buf)?;
    }

    Ok(())
}

/// Non-root ranks are resized to the root's length.
pub fn bcast_vec<T: CommData, C: Comm + ?Sized>(
    comm: &C,
    buf: &mut Vec<T>,
    root: usize,
) -> Result<(), CommError> {
    let mut n = buf.len();

    bcast_scalar(comm, &mut n, root)?;

    if comm.rank() != root {
        buf.clear();
        buf.resize(n, T::default());
    }

    bcast_slice(comm, buf.as_mut_slice(), root)
}

pub fn bcast_scalar<T: CommData, C: Comm + ?Sized>(
    comm: &C,
    v: &mut T,
    root: usize,
) -> Result<(), CommError> {
    bcast_slice(comm, std::slice::from_mut(v), root)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SerialComm;

impl Comm for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) -> Result<(), CommError> {
        Ok(())
    }

    fn bcast_bytes(&self, _buf: &mut Vec<u8>, root: usize) -> Result<(), CommError> {
        if root != 0 {
            return Err(CommError::InvalidRoot { root, size: 1 });
        }

        Ok(())
    }
}

struct Shared {
    size: usize,
    barrier: Barrier,
    slot: Mutex<Vec<u8>>,
}

/// One rank of an in-process world; each rank lives on its own thread.
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// The `size` ranks of a new world, in rank order.
    pub fn create(size: usize) -> Vec<ThreadComm> {
        assert!(size > 0, "a world needs at least one rank");

        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            slot: Mutex::new(Vec::new()),
        });

        (0..size)
            .map(|rank| ThreadComm {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    /// Runs `f` once per rank on scoped threads and returns the results in
    /// rank order. A panic on any rank is re-raised here.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(ThreadComm) -> R + Sync,
        R: Send,
    {
        let f = &f;

        std::thread::scope(|s| {
            let handles: Vec<_> = ThreadComm::create(size)
                .into_iter()
                .map(|comm| s.spawn(move || f(comm)))
                .collect();

            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(r) => r,
                    Err(e) => std::panic::resume_unwind(e),
                })
                .collect()
        })
    }
}

impl Comm for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn barrier(&self) -> Result<(), CommError> {
        self.shared.barrier.wait();

        Ok(())
    }

    // every rank passes all three barriers even on error, otherwise the
    // others would wait forever
    fn bcast_bytes(&self, buf: &mut Vec<u8>, root: usize) -> Result<(), CommError> {
        let size = self.shared.size;

        if root >= size {
            return Err(CommError::InvalidRoot { root, size });
        }

        self.shared.barrier.wait();

        let mut status = Ok(());

        if self.rank == root {
            match self.shared.slot.lock() {
                Ok(mut slot) => {
                    slot.clear();
                    slot.extend_from_slice(buf);
                }
                Err(_) => status = Err(CommError::Poisoned),
            }
        }

        self.shared.barrier.wait();

        if self.rank != root {
            match self.shared.slot.lock() {
                Ok(slot) => {
                    buf.clear();
                    buf.extend_from_slice(&slot);
                }
                Err(_) => status = Err(CommError::Poisoned),
            }
        }

        self.shared.barrier.wait();

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_comm() {
        let comm = SerialComm;

        assert!(comm.is_root());
        assert_eq!(comm.size(), 1);

        let mut v = vec![1.0, 2.0];
        bcast_vec(&comm, &mut v, 0).unwrap();
        assert_eq!(v, vec![1.0, 2.0]);

        assert_eq!(
            comm.bcast_bytes(&mut Vec::new(), 1),
            Err(CommError::InvalidRoot { root: 1, size: 1 })
        );
    }

    #[test]
    fn test_thread_comm_bcast_vec_from_every_root() {
        let nrank = 4;

        let results = ThreadComm::run(nrank, |comm| {
            let mut seen = Vec::new();

            for root in 0..comm.size() {
                let mut v: Vec<f64> = if comm.rank() == root {
                    (0..5 + root).map(|i| (i * 10 + root) as f64 + 0.25).collect()
                } else {
                    vec![-1.0; 2]
                };

                bcast_vec(&comm, &mut v, root).unwrap();

                seen.push(v);
            }

            seen
        });

        for root in 0..nrank {
            let expected: Vec<f64> = (0..5 + root).map(|i| (i * 10 + root) as f64 + 0.25).collect();

            for seen in results.iter() {
                assert_eq!(seen[root], expected);
            }
        }
    }

    #[test]
    fn test_thread_comm_bcast_slice_c64_and_scalar() {
        let results = ThreadComm::run(3, |comm| {
            let mut z = vec![c64::new(0.0, 0.0); 4];
            let mut n = 0usize;

            if comm.rank() == 1 {
                z = vec![
                    c64::new(1.0, -1.0),
                    c64::new(0.5, 2.0),
                    c64::new(-3.0, 0.0),
                    c64::new(0.0, 1e-300),
                ];
                n = 42;
            }

            bcast_slice(&comm, &mut z, 1).unwrap();
            bcast_scalar(&comm, &mut n, 1).unwrap();
            comm.barrier().unwrap();

            (z, n)
        });

        for (z, n) in results.iter() {
            assert_eq!(*z, results[1].0);
            assert_eq!(*n, 42);
        }
    }

    #[test]
    fn test_bcast_slice_length_mismatch_is_reported() {
        let results = ThreadComm::run(2, |comm| {
            let mut v = if comm.is_root() { vec![1i32; 3] } else { vec![0i32; 2] };

            bcast_slice(&comm, &mut v, 0)
        });

        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(CommError::LengthMismatch {
                expected: 8,
                got: 12
            })
        );
    }
}
