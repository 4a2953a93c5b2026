mod cdx;
