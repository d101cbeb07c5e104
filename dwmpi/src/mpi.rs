use crate::{Comm, CommError};
use mpi_sys::*;
use std::os::raw::*;
use std::ptr;

fn check(call: &'static str, code: c_int) -> Result<(), CommError> {
    if code == MPI_SUCCESS {
        Ok(())
    } else {
        Err(CommError::Mpi { call, code })
    }
}

/// The ranks of an MPI communicator, by default `MPI_COMM_WORLD`.
///
/// Broadcasts send the root's length as one `MPI_UNSIGNED_LONG_LONG`, then
/// the bytes themselves as `MPI_BYTE`, so a buffer arrives unchanged.
#[derive(Debug)]
pub struct MpiComm {
    comm: mpi_sys::MpiComm,
    rank: usize,
    size: usize,
}

impl MpiComm {
    /// Initializes MPI if nobody has yet and returns the world.
    pub fn init() -> Result<MpiComm, CommError> {
        let mut flag: c_int = 0;

        check("MPI_Initialized", unsafe { MPI_Initialized(&mut flag) })?;

        if flag == 0 {
            check("MPI_Init", unsafe { MPI_Init(ptr::null(), ptr::null()) })?;
        }

        MpiComm::world()
    }

    /// MPI_COMM_WORLD of an already initialized job.
    pub fn world() -> Result<MpiComm, CommError> {
        let mut rank: c_int = 0;
        let mut size: c_int = 0;

        check("MPI_Comm_rank", unsafe { MPI_Comm_rank(MPI_COMM_WORLD, &mut rank) })?;
        check("MPI_Comm_size", unsafe { MPI_Comm_size(MPI_COMM_WORLD, &mut size) })?;

        Ok(MpiComm {
            comm: MPI_COMM_WORLD,
            rank: rank as usize,
            size: size as usize,
        })
    }

    pub fn finalize(self) -> Result<(), CommError> {
        check("MPI_Finalize", unsafe { MPI_Finalize() })
    }
}

impl Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), CommError> {
        check("MPI_Barrier", unsafe { MPI_Barrier(self.comm) })
    }

    fn bcast_bytes(&self, buf: &mut Vec<u8>, root: usize) -> Result<(), CommError> {
        if root >= self.size {
            return Err(CommError::InvalidRoot {
                root,
                size: self.size,
            });
        }

        let mut len = buf.len() as u64;

        check("MPI_Bcast", unsafe {
            MPI_Bcast(
                &mut len as *mut u64 as *mut c_void,
                1,
                MPI_UNSIGNED_LONG_LONG,
                root as c_int,
                self.comm,
            )
        })?;

        // every rank sees the same length, so every rank takes the same branch
        if len > c_int::MAX as u64 {
            return Err(CommError::TooLarge { len: len as usize });
        }

        if self.rank != root {
            buf.clear();
            buf.resize(len as usize, 0);
        }

        check("MPI_Bcast", unsafe {
            MPI_Bcast(
                buf.as_mut_ptr() as *mut c_void,
                len as c_int,
                MPI_BYTE,
                root as c_int,
                self.comm,
            )
        })
    }
}
