use core::ops::{Deref, DerefMut};

#[cfg(any(feature = "boxed-memblock", target_arch = "wasm32"))]
type MemBlockStorage<T, const N: usize> = Box<[T; N]>;

#[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
type MemBlockStorage<T, const N: usize> = [T; N];

/// Fixed-size block of PPU-side memory (OAM, palette RAM, nametable RAM, ...).
///
/// Stored inline by default; the `boxed-memblock` feature moves the storage
/// to the heap for targets with small stacks.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemBlock<T, const N: usize>(MemBlockStorage<T, N>);

#[cfg(feature = "savestate-serde")]
impl<T, const N: usize> serde::Serialize for MemBlock<T, N>
where
    T: Copy + Default + serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let slice = self.as_slice();
        let mut seq = serializer.serialize_seq(Some(slice.len()))?;
        for item in slice {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

#[cfg(feature = "savestate-serde")]
impl<'de, T, const N: usize> serde::Deserialize<'de> for MemBlock<T, N>
where
    T: Copy + Default + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor<T, const N: usize>(core::marker::PhantomData<T>);

        impl<'de, T, const N: usize> serde::de::Visitor<'de> for Visitor<T, N>
        where
            T: Copy + Default + serde::Deserialize<'de>,
        {
            type Value = MemBlock<T, N>;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "a sequence of length {N}")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = MemBlock::<T, N>::new();
                for idx in 0..N {
                    let Some(value) = seq.next_element::<T>()? else {
                        return Err(serde::de::Error::invalid_length(idx, &self));
                    };
                    out.as_mut_slice()[idx] = value;
                }
                Ok(out)
            }
        }

        deserializer.deserialize_seq(Visitor::<T, N>(core::marker::PhantomData))
    }
}

pub mod ppu {
    use crate::memory::ppu as ppu_mem;

    /// Nametable RAM: 2 KiB of CIRAM plus the 2 KiB a four-screen board adds.
    pub type NametableRam = super::MemBlock<u8, { ppu_mem::NAMETABLE_RAM_SIZE }>;
    pub type PaletteRam = super::MemBlock<u8, { ppu_mem::PALETTE_RAM_SIZE }>;
    pub type OamRam = super::MemBlock<u8, { ppu_mem::OAM_RAM_SIZE }>;
    pub type SecondaryOamRam = super::MemBlock<u8, { ppu_mem::SECONDARY_OAM_RAM_SIZE }>;
}

impl<T, const N: usize> MemBlock<T, N> {
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        #[cfg(any(feature = "boxed-memblock", target_arch = "wasm32"))]
        {
            &*self.0
        }
        #[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
        {
            &self.0
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        #[cfg(any(feature = "boxed-memblock", target_arch = "wasm32"))]
        {
            &mut *self.0
        }
        #[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
        {
            &mut self.0
        }
    }
}

impl<T: Copy + Default, const N: usize> MemBlock<T, N> {
    pub fn new() -> Self {
        Self(new_storage_filled(T::default()))
    }
}

impl<T: Copy, const N: usize> MemBlock<T, N> {
    /// Create a `MemBlock` where every element is initialized to `value`.
    #[inline]
    pub fn filled(value: T) -> Self {
        Self(new_storage_filled(value))
    }
}

impl<T: Copy + Default, const N: usize> Default for MemBlock<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for MemBlock<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for MemBlock<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

#[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
impl<T: Copy, const N: usize> Copy for MemBlock<T, N> {}

#[cfg(any(feature = "boxed-memblock", target_arch = "wasm32"))]
fn new_storage_filled<T: Copy, const N: usize>(value: T) -> MemBlockStorage<T, N> {
    Box::new([value; N])
}

#[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
fn new_storage_filled<T: Copy, const N: usize>(value: T) -> MemBlockStorage<T, N> {
    [value; N]
}
