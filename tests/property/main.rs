mod decode;
mod normalize;
